//! API error type and response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Operation requires a scorer identity (400)
    #[error("No scorer identity supplied")]
    MissingIdentity,

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Export requested before any scorer recorded anything (404)
    #[error("No scorer data recorded yet")]
    NoData,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<scorer_core::Error> for ApiError {
    fn from(err: scorer_core::Error) -> Self {
        use scorer_core::Error;
        match err {
            Error::MissingIdentity => ApiError::MissingIdentity,
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NoData => ApiError::NoData,
            Error::Manifest(msg) => ApiError::Internal(format!("Manifest error: {}", msg)),
            Error::Io(err) => ApiError::Internal(format!("IO error: {}", err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::MissingIdentity => (
                StatusCode::BAD_REQUEST,
                "MISSING_IDENTITY",
                "No scorer identity supplied".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::NoData => (
                StatusCode::NOT_FOUND,
                "NO_DATA",
                "No scorer data recorded yet".to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
