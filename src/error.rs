//! Error types for the sandbox API
//!
//! Expected outcomes (cache misses, blocked requests, unknown flags on
//! evaluation) are ordinary return values; these errors only cover requests
//! the API cannot serve.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Sandbox Error Enum ==
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Malformed or out-of-range request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Session is not being tracked
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Named flag does not exist in the session
    #[error("Flag not found: {0}")]
    FlagNotFound(String),

    /// Flag key already taken in the session
    #[error("Flag already exists: {0}")]
    FlagExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for SandboxError {
    fn into_response(self) -> Response {
        let status = match &self {
            SandboxError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SandboxError::SessionNotFound(_) | SandboxError::FlagNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SandboxError::FlagExists(_) => StatusCode::CONFLICT,
            SandboxError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, SandboxError>;
