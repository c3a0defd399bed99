use tracing::info;
use crate::core::errors::ApiError;
use crate::core::kv::Kv;
use crate::config::*;

/// Idempotently insert the (follower, followed) edge. The inverse index
/// under `followers:{followed}` is maintained in the same transaction so
/// follower counts never require a scan.
pub fn follow_user<S: Kv>(store: &S, follower_id: &str, followed_id: &str) -> Result<(), ApiError> {
    if follower_id == followed_id {
        return Err(ApiError::SelfFollow);
    }

    let followings_key = followings_key(follower_id);
    let mut followings: Vec<String> = store.get_json(&followings_key)?.unwrap_or_default();
    if !followings.contains(&followed_id.to_string()) {
        followings.push(followed_id.to_string());
        store.set_json(&followings_key, &followings)?;

        let followers_key = followers_key(followed_id);
        let mut followers: Vec<String> = store.get_json(&followers_key)?.unwrap_or_default();
        if !followers.contains(&follower_id.to_string()) {
            followers.push(follower_id.to_string());
            store.set_json(&followers_key, &followers)?;
        }
        info!(follower = %follower_id, followed = %followed_id, "follow edge added");
    }

    Ok(())
}

/// Idempotently remove the (follower, followed) edge and its inverse entry.
pub fn unfollow_user<S: Kv>(store: &S, follower_id: &str, followed_id: &str) -> Result<(), ApiError> {
    if follower_id == followed_id {
        return Err(ApiError::SelfFollow);
    }

    let followings_key = followings_key(follower_id);
    let mut followings: Vec<String> = store.get_json(&followings_key)?.unwrap_or_default();
    if followings.iter().any(|id| id == followed_id) {
        followings.retain(|id| id != followed_id);
        store.set_json(&followings_key, &followings)?;

        let followers_key = followers_key(followed_id);
        let mut followers: Vec<String> = store.get_json(&followers_key)?.unwrap_or_default();
        followers.retain(|id| id != follower_id);
        store.set_json(&followers_key, &followers)?;
        info!(follower = %follower_id, followed = %followed_id, "follow edge removed");
    }

    Ok(())
}

pub fn is_following<S: Kv>(store: &S, follower_id: &str, followed_id: &str) -> anyhow::Result<bool> {
    let followings: Vec<String> = store.get_json(&followings_key(follower_id))?.unwrap_or_default();
    Ok(followings.iter().any(|id| id == followed_id))
}

pub fn followings_of<S: Kv>(store: &S, user_id: &str) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(&followings_key(user_id))?.unwrap_or_default())
}

pub fn following_count<S: Kv>(store: &S, user_id: &str) -> anyhow::Result<usize> {
    let followings: Vec<String> = store.get_json(&followings_key(user_id))?.unwrap_or_default();
    Ok(followings.len())
}

pub fn followers_count<S: Kv>(store: &S, user_id: &str) -> anyhow::Result<usize> {
    let followers: Vec<String> = store.get_json(&followers_key(user_id))?.unwrap_or_default();
    Ok(followers.len())
}
