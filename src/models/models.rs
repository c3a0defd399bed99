use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Post {
    pub id: u64,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TokenData {
    pub user_id: String,
    pub created_at: String,
}

/// Serialized post as it goes out to clients. `liked_by_viewer` is computed
/// per request against the viewer identity, never stored on the post.
#[derive(Serialize, Deserialize, Clone)]
pub struct PostView {
    pub id: u64,
    pub author: String,
    pub author_id: String,
    pub content: String,
    pub timestamp: String,
    pub likes_count: usize,
    pub liked_by_viewer: bool,
}

#[derive(Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub following_count: usize,
    pub followers_count: usize,
    pub is_following: bool,
}
