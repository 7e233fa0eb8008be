//! Error types for the offline cache proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Worker Error Enum ==
/// Unified error type for the worker, cache storage and proxy.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The network attempt failed (offline, refused, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// A manifest asset could not be fetched during install
    #[error("Install failed for {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    /// Lifecycle step attempted from the wrong state
    #[error("Invalid worker state: {0}")]
    InvalidState(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Snapshot could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkerError::Network(_) => StatusCode::BAD_GATEWAY,
            WorkerError::InstallFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WorkerError::InvalidState(_) => StatusCode::CONFLICT,
            WorkerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WorkerError::Snapshot(_) | WorkerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        WorkerError::Snapshot(err.to_string())
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(err: serde_json::Error) -> Self {
        WorkerError::Snapshot(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, WorkerError>;
