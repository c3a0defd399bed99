use spin_sdk::http::{Request, Response};
use tracing::info;
use uuid::Uuid;
use crate::models::models::User;
use crate::core::helpers::{hash_password, sanitize_text};
use crate::core::errors::ApiError;
use crate::core::kv::Kv;
use crate::config::*;

pub fn get_user<S: Kv>(store: &S, user_id: &str) -> anyhow::Result<Option<User>> {
    store.get_json(&user_key(user_id))
}

pub fn find_by_username<S: Kv>(store: &S, username: &str) -> anyhow::Result<Option<User>> {
    let user_id: Option<String> = store.get_json(&username_key(username))?;
    match user_id {
        Some(id) => get_user(store, &id),
        None => Ok(None),
    }
}

/// Create a new account. Usernames are unique; the index entry under
/// `username:{name}` is written together with the user record.
pub fn create_user<S: Kv>(
    store: &S,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required.".to_string()));
    }
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest("Username must be 3-50 characters.".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password is required.".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest("Password must be at least 3 characters.".to_string()));
    }

    // Sanitize username at input time
    let username = sanitize_text(username.trim());
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ApiError::BadRequest("Username must be 3-50 characters.".to_string()));
    }

    if find_by_username(store, &username)?.is_some() {
        return Err(ApiError::DuplicateUsername);
    }

    let id = Uuid::new_v4().to_string();
    let user = User {
        id: id.clone(),
        username: username.clone(),
        email: email.to_string(),
        password: hash_password(password)?,
    };

    store.set_json(&user_key(&id), &user)?;
    store.set_json(&username_key(&username), &id)?;

    info!(user_id = %id, username = %username, "registered user");
    Ok(user)
}

// === HTTP handlers ===

pub fn register<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body.".to_string()).into()),
    };
    let username = body["username"].as_str().unwrap_or("");
    let email = body["email"].as_str().unwrap_or("");
    let password = body["password"].as_str().unwrap_or("");

    // Ensure password matches confirmation when one is supplied
    if let Some(confirmation) = body["confirmation"].as_str() {
        if confirmation != password {
            return Ok(ApiError::BadRequest("Passwords must match.".to_string()).into());
        }
    }

    let user = match create_user(store, username, email, password) {
        Ok(user) => user,
        Err(err) => return Ok(err.into()),
    };

    Ok(Response::builder()
        .status(201)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({
            "id": user.id,
            "username": user.username,
        }))?)
        .build())
}
