use spin_sdk::http::{Request, Response};
use tracing::info;
use uuid::Uuid;
use crate::models::models::TokenData;
use crate::config::{token_expiration_hours, token_key};
use crate::core::errors::ApiError;
use crate::core::helpers::now_iso;
use crate::core::kv::Kv;
use crate::users;

pub fn login_user<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let creds: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body.".to_string()).into()),
    };
    let username = creds["username"].as_str().unwrap_or_default();
    let password = creds["password"].as_str().unwrap_or_default();

    let user = match users::find_by_username(store, username)? {
        Some(user) => user,
        None => return Ok(ApiError::InvalidCredentials.into()),
    };
    if !crate::core::helpers::verify_password(password, &user.password) {
        return Ok(ApiError::InvalidCredentials.into());
    }

    let token = Uuid::new_v4().to_string();
    let data = TokenData {
        user_id: user.id.clone(),
        created_at: now_iso(),
    };
    store.set_json(&token_key(&token), &data)?;
    info!(user_id = %user.id, "login");

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({
            "token": token,
            "user_id": user.id,
        }))?)
        .build())
}

pub fn logout_user<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let token = match bearer_token(&req) {
        Some(token) => token,
        None => return Ok(ApiError::Unauthenticated.into()),
    };
    store.delete(&token_key(&token))?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({
            "message": "Logged out successfully",
        }))?)
        .build())
}

fn bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.header("Authorization")?.as_str().unwrap_or_default();
    auth_header.strip_prefix("Bearer ").map(|t| t.to_string())
}

/// Resolve the request's bearer token to a user id. Expired tokens and
/// tokens for users that no longer exist resolve to no identity.
pub fn validate_token<S: Kv>(store: &S, req: &Request) -> Option<String> {
    let token = bearer_token(req)?;
    let data: TokenData = store.get_json(&token_key(&token)).ok()??;

    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&data.created_at) {
        let now = chrono::Utc::now();
        let age_hours = (now - created.with_timezone(&chrono::Utc)).num_hours();
        if age_hours > token_expiration_hours() {
            return None;
        }
    }
    if users::get_user(store, &data.user_id).ok()?.is_none() {
        return None;
    }
    Some(data.user_id)
}
