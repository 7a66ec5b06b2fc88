//! HTTP error types for the DocVault server.
//!
//! Maps domain errors from `docvault-core` into appropriate HTTP responses.
//! Every error variant produces a JSON body with a machine-readable `error`
//! field and a human-readable `message`. Library errors are display-only —
//! they never disturb gate state.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use docvault_core::error::{GateError, ManifestError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// No valid session — access gate not passed.
    Unauthorized(String),
    /// Requested document or record not found.
    NotFound(String),
    /// Client sent invalid input.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ManifestError> for AppError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::NotFound { .. } => Self::NotFound(err.to_string()),
            ManifestError::Read { .. } | ManifestError::Parse { .. } | ManifestError::Scan { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}
