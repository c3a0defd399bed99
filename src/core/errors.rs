use spin_sdk::http::Response;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    EmptyContent,
    InvalidAction(String),
    SelfFollow,
    DuplicateUsername,
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound(String),
    UserNotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_)
            | ApiError::EmptyContent
            | ApiError::InvalidAction(_)
            | ApiError::SelfFollow => 400,
            ApiError::InvalidCredentials => 401,
            ApiError::Unauthenticated | ApiError::Forbidden => 403,
            ApiError::NotFound(_) | ApiError::UserNotFound(_) => 404,
            ApiError::DuplicateUsername => 409,
            ApiError::InternalError(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::EmptyContent => "empty_content",
            ApiError::InvalidAction(_) => "invalid_action",
            ApiError::SelfFollow => "self_follow",
            ApiError::DuplicateUsername => "duplicate_username",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::UserNotFound(_) => "user_not_found",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::EmptyContent => write!(f, "Content cannot be empty."),
            ApiError::InvalidAction(action) => write!(f, "Invalid action: {}.", action),
            ApiError::SelfFollow => write!(f, "You cannot follow yourself."),
            ApiError::DuplicateUsername => write!(f, "Username already taken."),
            ApiError::InvalidCredentials => write!(f, "Invalid username and/or password."),
            ApiError::Unauthenticated => write!(f, "You must be logged in."),
            ApiError::Forbidden => write!(f, "You can only edit your own posts."),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::UserNotFound(username) => write!(f, "User {} not found.", username),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let body = serde_json::json!({
            "error": err.kind(),
            "message": err.to_string(),
        });
        Response::builder()
            .status(err.status())
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&body).unwrap_or_default())
            .build()
    }
}

impl std::error::Error for ApiError {}

// Store failures surface as 500s at the API boundary.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
