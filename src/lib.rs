use spin_sdk::http::{Request, Response};

#[cfg(target_arch = "wasm32")]
use spin_sdk::{http::IntoResponse, http_component};

pub mod config;
pub mod core;
pub mod models;

pub mod auth;
pub mod users;
pub mod follow;
pub mod posts;
pub mod feed;
pub mod interactions;

use crate::core::errors::ApiError;
use crate::core::kv::Kv;

/// Transport-agnostic dispatcher. Both the Spin component and the native
/// actix adapter feed requests through here against a shared store.
pub fn route<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let method = req.method().to_string();
    let path = req.path().to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/users") => users::register(store, req),
        ("POST", "/login") => auth::login_user(store, req),
        ("POST", "/logout") => auth::logout_user(store, req),
        ("GET", "/posts") => feed::handle_posts(store, req),
        ("POST", "/posts") => interactions::handle_new_post(store, req),
        ("GET", "/following") => feed::handle_following(store, req),
        ("POST", p) if p.starts_with("/posts/") && p.ends_with("/like") => {
            interactions::handle_like(store, req)
        }
        ("PUT", p) if p.starts_with("/posts/") => interactions::handle_edit_post(store, req),
        ("GET", p) if p.starts_with("/posts/") => feed::handle_post(store, req),
        ("POST", p) if p.starts_with("/profile/") && p.ends_with("/follow") => {
            interactions::handle_follow(store, req)
        }
        ("GET", p) if p.starts_with("/profile/") => feed::handle_profile(store, req),
        _ => Ok(ApiError::NotFound("No route found.".to_string()).into()),
    }
}

#[cfg(target_arch = "wasm32")]
#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    let store = crate::core::helpers::store();
    if config::seed_demo_enabled() {
        let _ = crate::core::db::seed_demo_data(&store);
    }
    route(&store, req)
}
