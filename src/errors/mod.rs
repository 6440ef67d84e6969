//! Error handling module for the CastDeck backend.
//!
//! Centralized error types with mapping to HTTP status codes and response
//! envelopes. A conflict is not a generic failure: it gets its own status
//! (409) and carries the authoritative current slice value so the caller
//! can re-render instead of retrying blindly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::models::SliceName;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Structural rejection (e.g. an empty scene); field-level problems
    /// never reach here, the sanitisers absorb them.
    Validation(String),
    /// Stale-timestamp write; carries the current canonical slice value.
    Conflict { slice: SliceName, current: Value },
    /// Malformed request body
    BadRequest(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    pub fn conflict<T: Serialize>(slice: SliceName, current: &T) -> Self {
        AppError::Conflict {
            slice,
            current: serde_json::to_value(current).unwrap_or(Value::Null),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict { .. } => codes::CONFLICT,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Conflict { slice, .. } => {
                format!("Slice '{}' changed since it was last read", slice)
            }
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = serde_json::Map::new();
        body.insert("ok".to_string(), Value::Bool(false));
        body.insert(
            "error".to_string(),
            serde_json::json!({
                "code": self.error_code(),
                "message": self.message(),
            }),
        );
        // Conflicts also carry the authoritative value under the slice key
        // so the client can reconcile without a second round trip.
        if let AppError::Conflict { slice, current } = self {
            body.insert(slice.as_str().to_string(), current);
        }
        (status, Json(Value::Object(body))).into_response()
    }
}
