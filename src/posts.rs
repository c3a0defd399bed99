use tracing::info;
use crate::models::models::Post;
use crate::core::helpers::{now_iso, sanitize_text};
use crate::core::errors::ApiError;
use crate::core::kv::Kv;
use crate::config::*;

fn next_post_id<S: Kv>(store: &S) -> anyhow::Result<u64> {
    let last: u64 = store.get_json(POST_SEQ_KEY)?.unwrap_or(0);
    let next = last + 1;
    store.set_json(POST_SEQ_KEY, &next)?;
    Ok(next)
}

fn validated_content(content: &str) -> Result<String, ApiError> {
    let content = sanitize_text(content).trim().to_string();
    if content.is_empty() {
        return Err(ApiError::EmptyContent);
    }
    if content.len() > max_post_length() {
        return Err(ApiError::BadRequest("Content is too long.".to_string()));
    }
    Ok(content)
}

/// Create a post. Ids come from a monotonically increasing sequence, so the
/// feed ordering tiebreak (id descending) matches insertion order even when
/// two posts land on the same timestamp.
pub fn create_post<S: Kv>(store: &S, author_id: &str, content: &str) -> Result<Post, ApiError> {
    let content = validated_content(content)?;

    let id = next_post_id(store)?;
    let post = Post {
        id,
        author_id: author_id.to_string(),
        content,
        created_at: now_iso(),
        updated_at: None,
    };

    store.set_json(&post_key(id), &post)?;

    // Prepend to the global feed and the author's post index
    let mut feed: Vec<u64> = store.get_json(FEED_KEY)?.unwrap_or_default();
    feed.insert(0, id);
    store.set_json(FEED_KEY, &feed)?;

    let author_posts_key = user_posts_key(author_id);
    let mut author_posts: Vec<u64> = store.get_json(&author_posts_key)?.unwrap_or_default();
    author_posts.insert(0, id);
    store.set_json(&author_posts_key, &author_posts)?;

    info!(post_id = id, author = %author_id, "created post");
    Ok(post)
}

/// Edit a post's content. Only the author may edit; `created_at` is
/// immutable so the post keeps its place in every feed.
pub fn edit_post<S: Kv>(
    store: &S,
    post_id: u64,
    requesting_user_id: &str,
    new_content: &str,
) -> Result<Post, ApiError> {
    let mut post = get_post(store, post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found.".to_string()))?;
    if post.author_id != requesting_user_id {
        return Err(ApiError::Forbidden);
    }

    let content = validated_content(new_content)?;

    // Skip the write if content didn't change
    if post.content != content {
        post.content = content;
        post.updated_at = Some(now_iso());
        store.set_json(&post_key(post_id), &post)?;
        info!(post_id, "edited post");
    }

    Ok(post)
}

pub fn get_post<S: Kv>(store: &S, post_id: u64) -> anyhow::Result<Option<Post>> {
    store.get_json(&post_key(post_id))
}

/// Idempotently add the (user, post) like edge; returns the new like count.
pub fn like_post<S: Kv>(store: &S, post_id: u64, user_id: &str) -> Result<usize, ApiError> {
    if get_post(store, post_id)?.is_none() {
        return Err(ApiError::NotFound("Post not found.".to_string()));
    }

    let likes_key = likes_key(post_id);
    let mut likes: Vec<String> = store.get_json(&likes_key)?.unwrap_or_default();
    if !likes.contains(&user_id.to_string()) {
        likes.push(user_id.to_string());
        store.set_json(&likes_key, &likes)?;
        info!(post_id, user = %user_id, "like added");
    }
    Ok(likes.len())
}

/// Idempotently remove the (user, post) like edge; returns the new like count.
pub fn unlike_post<S: Kv>(store: &S, post_id: u64, user_id: &str) -> Result<usize, ApiError> {
    if get_post(store, post_id)?.is_none() {
        return Err(ApiError::NotFound("Post not found.".to_string()));
    }

    let likes_key = likes_key(post_id);
    let mut likes: Vec<String> = store.get_json(&likes_key)?.unwrap_or_default();
    if likes.iter().any(|id| id == user_id) {
        likes.retain(|id| id != user_id);
        store.set_json(&likes_key, &likes)?;
        info!(post_id, user = %user_id, "like removed");
    }
    Ok(likes.len())
}

pub fn like_count<S: Kv>(store: &S, post_id: u64) -> anyhow::Result<usize> {
    let likes: Vec<String> = store.get_json(&likes_key(post_id))?.unwrap_or_default();
    Ok(likes.len())
}

pub fn is_liked_by<S: Kv>(store: &S, post_id: u64, user_id: &str) -> anyhow::Result<bool> {
    let likes: Vec<String> = store.get_json(&likes_key(post_id))?.unwrap_or_default();
    Ok(likes.iter().any(|id| id == user_id))
}

/// All posts by one author, via the incrementally maintained index.
pub fn posts_by<S: Kv>(store: &S, user_id: &str) -> anyhow::Result<Vec<Post>> {
    let ids: Vec<u64> = store.get_json(&user_posts_key(user_id))?.unwrap_or_default();
    fetch_posts(store, &ids)
}

pub fn all_posts<S: Kv>(store: &S) -> anyhow::Result<Vec<Post>> {
    let ids: Vec<u64> = store.get_json(FEED_KEY)?.unwrap_or_default();
    fetch_posts(store, &ids)
}

fn fetch_posts<S: Kv>(store: &S, ids: &[u64]) -> anyhow::Result<Vec<Post>> {
    let mut posts = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(post) = get_post(store, *id)? {
            posts.push(post);
        }
    }
    Ok(posts)
}
