pub const POSTS_PER_PAGE: usize = 10;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;

pub const FEED_KEY: &str = "feed";
pub const POST_SEQ_KEY: &str = "post_seq";

pub fn token_expiration_hours() -> i64 {
    std::env::var("RIPPLE_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn max_post_length() -> usize {
    std::env::var("RIPPLE_MAX_POST_LENGTH")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(5000)
}

pub fn seed_demo_enabled() -> bool {
    std::env::var("RIPPLE_SEED_DEMO")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

// === KV key layout ===

pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn username_key(username: &str) -> String {
    format!("username:{}", username)
}

pub fn post_key(post_id: u64) -> String {
    format!("post:{}", post_id)
}

pub fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

pub fn followings_key(user_id: &str) -> String {
    format!("followings:{}", user_id)
}

pub fn followers_key(user_id: &str) -> String {
    format!("followers:{}", user_id)
}

pub fn user_posts_key(user_id: &str) -> String {
    format!("user_posts:{}", user_id)
}

pub fn likes_key(post_id: u64) -> String {
    format!("likes:{}", post_id)
}
