use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::AuthError;
use thiserror::Error;
use tracing::error;

/// Error body: `{"error": <code>, "detail": <message>}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: u16,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: u16, detail: impl Into<String>) -> Self {
        Self { status, code, detail: detail.into() }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        match e {
            AuthError::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, code, msg),
            AuthError::DuplicateEmail => ApiError::new(StatusCode::CONFLICT, code, "Email already registered"),
            AuthError::UserNotFound => ApiError::new(StatusCode::NOT_FOUND, code, "User not found"),
            AuthError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, code, "Invalid credentials"),
            AuthError::HashError(msg) | AuthError::StoreUnavailable(msg) => {
                // Infrastructure details stay in the logs.
                error!(code, error = %msg, "request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, code, "Service unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, 1000, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.code, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store setup failed: {0}")]
    Store(String),
}
