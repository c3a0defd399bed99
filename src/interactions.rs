//! Write operations: each handler is a single authorize-then-mutate-then-
//! serialize step. Every mutation is idempotent, so a retried request
//! produces the same end state and the same success response.

use spin_sdk::http::{Request, Response};
use crate::core::errors::ApiError;
use crate::core::kv::Kv;
use crate::auth::validate_token;
use crate::{feed, follow, posts, users};

fn json_body(req: &Request) -> Result<serde_json::Value, ApiError> {
    serde_json::from_slice(req.body())
        .map_err(|_| ApiError::BadRequest("Invalid JSON body.".to_string()))
}

pub fn handle_new_post<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let author_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthenticated.into()),
    };

    let body = match json_body(&req) {
        Ok(v) => v,
        Err(err) => return Ok(err.into()),
    };
    let content = body["content"].as_str().unwrap_or_default();

    let post = match posts::create_post(store, &author_id, content) {
        Ok(post) => post,
        Err(err) => return Ok(err.into()),
    };
    let view = feed::to_view(store, &post, Some(&author_id))?;

    Ok(Response::builder()
        .status(201)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&view)?)
        .build())
}

pub fn handle_edit_post<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthenticated.into()),
    };

    let post_id = match req.path().trim_start_matches("/posts/").parse::<u64>() {
        Ok(id) => id,
        Err(_) => return Ok(ApiError::BadRequest("Post ID required.".to_string()).into()),
    };

    let body = match json_body(&req) {
        Ok(v) => v,
        Err(err) => return Ok(err.into()),
    };
    let content = body["content"].as_str().unwrap_or_default();

    let post = match posts::edit_post(store, post_id, &user_id, content) {
        Ok(post) => post,
        Err(err) => return Ok(err.into()),
    };
    let view = feed::to_view(store, &post, Some(&user_id))?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&view)?)
        .build())
}

pub fn handle_like<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthenticated.into()),
    };

    let path = req.path();
    let post_id = match path
        .trim_start_matches("/posts/")
        .trim_end_matches("/like")
        .parse::<u64>()
    {
        Ok(id) => id,
        Err(_) => return Ok(ApiError::BadRequest("Post ID required.".to_string()).into()),
    };

    let body = match json_body(&req) {
        Ok(v) => v,
        Err(err) => return Ok(err.into()),
    };
    let action = body["action"].as_str().unwrap_or_default();

    let (result, liked) = match action {
        "like" => (posts::like_post(store, post_id, &user_id), true),
        "unlike" => (posts::unlike_post(store, post_id, &user_id), false),
        other => return Ok(ApiError::InvalidAction(other.to_string()).into()),
    };
    let likes = match result {
        Ok(count) => count,
        Err(err) => return Ok(err.into()),
    };

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({
            "message": "Success",
            "likes": likes,
            "liked": liked,
        }))?)
        .build())
}

pub fn handle_follow<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let user_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthenticated.into()),
    };

    let raw = req
        .path()
        .trim_start_matches("/profile/")
        .trim_end_matches("/follow");
    let username = urlencoding::decode(raw)
        .unwrap_or(std::borrow::Cow::Borrowed(raw))
        .to_string();

    let target = match users::find_by_username(store, &username)? {
        Some(user) => user,
        None => return Ok(ApiError::UserNotFound(username).into()),
    };

    let body = match json_body(&req) {
        Ok(v) => v,
        Err(err) => return Ok(err.into()),
    };
    let action = body["action"].as_str().unwrap_or_default();

    let (result, is_following) = match action {
        "follow" => (follow::follow_user(store, &user_id, &target.id), true),
        "unfollow" => (follow::unfollow_user(store, &user_id, &target.id), false),
        other => return Ok(ApiError::InvalidAction(other.to_string()).into()),
    };
    if let Err(err) = result {
        return Ok(err.into());
    }

    let followers_count = follow::followers_count(store, &target.id)?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({
            "message": "Success",
            "is_following": is_following,
            "followers_count": followers_count,
        }))?)
        .build())
}
