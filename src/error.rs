//! Error types for the directory service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Directory Error Enum ==
/// Unified error type for the directory service.
///
/// Cache-tier failures never appear here: every remote-cache or memory-tier
/// problem is handled inside the caching core and degrades to a miss. Only
/// origin (repository) and request-shape errors surface to callers.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Site entry not found in the origin store
    #[error("Site entry not found: {0}")]
    NotFound(i64),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Origin data store failure, propagated as-is
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DirectoryError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Site entry not found: {}", id))
            }
            DirectoryError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            DirectoryError::Repository(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            DirectoryError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the directory service.
pub type Result<T> = std::result::Result<T, DirectoryError>;
