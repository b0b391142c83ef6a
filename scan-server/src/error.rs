//! HTTP error mapping.
//!
//! Every error renders as a `{ "success": false, "error": ... }` JSON body.
//! Validation failures respond with 400 and keep their diagnostic fields in
//! all environments; failures after validation respond with 500 and carry
//! detail only in development mode.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use core_runtime::config::Environment;
use core_scanner::ScanError;
use serde_json::{json, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request body must be a JSON object")]
    InvalidBody,

    #[error("Directory path is required and must be a string")]
    MissingDirectory,

    #[error("Directory does not exist or is not accessible: {path}")]
    NotAccessible {
        path: String,
        details: String,
        code: Option<String>,
    },

    #[error("The specified path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Cannot read directory contents: {path}")]
    NotReadable { path: String, details: String },

    #[error("Error scanning directory")]
    ScanFailed { details: Option<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal { details: Option<String> },
}

impl ApiError {
    /// Maps a scanner failure to its HTTP representation.
    ///
    /// Validation failures keep their diagnostic fields; a walk failure after
    /// validation passed keeps its detail only in development mode.
    pub fn from_scan_error(err: ScanError, environment: Environment) -> Self {
        match err {
            ScanError::NotAccessible {
                path,
                details,
                code,
            } => Self::NotAccessible {
                path,
                details,
                code,
            },
            ScanError::NotADirectory { path } => Self::NotADirectory { path },
            ScanError::NotReadable { path, details } => Self::NotReadable { path, details },
            ScanError::WalkFailed { details } => Self::ScanFailed {
                details: environment.is_development().then_some(details),
            },
        }
    }

    /// Wraps an unexpected failure, keeping its detail only in development
    /// mode.
    pub fn internal(details: impl Into<String>, environment: Environment) -> Self {
        Self::Internal {
            details: environment.is_development().then(|| details.into()),
        }
    }

    /// HTTP status this error responds with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody
            | Self::MissingDirectory
            | Self::NotAccessible { .. }
            | Self::NotADirectory { .. }
            | Self::NotReadable { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ScanFailed { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> Value {
        match self {
            Self::InvalidBody => json!({
                "success": false,
                "error": "Request body must be a JSON object",
            }),
            Self::MissingDirectory => json!({
                "success": false,
                "error": "Directory path is required and must be a string",
            }),
            Self::NotAccessible {
                path,
                details,
                code,
            } => {
                let mut body = json!({
                    "success": false,
                    "error": "Directory does not exist or is not accessible",
                    "path": path,
                    "details": details,
                });
                if let Some(code) = code {
                    body["code"] = Value::String(code);
                }
                body
            }
            Self::NotADirectory { path } => json!({
                "success": false,
                "error": "The specified path is not a directory",
                "path": path,
            }),
            Self::NotReadable { path, details } => json!({
                "success": false,
                "error": "Cannot read directory contents",
                "path": path,
                "details": details,
            }),
            Self::ScanFailed { details } => {
                let mut body = json!({
                    "success": false,
                    "error": "Error scanning directory",
                });
                if let Some(details) = details {
                    body["details"] = Value::String(details);
                }
                body
            }
            Self::NotFound(message) => json!({
                "success": false,
                "error": message,
            }),
            Self::Internal { details } => {
                let mut body = json!({
                    "success": false,
                    "error": "Internal server error",
                });
                if let Some(details) = details {
                    body["details"] = Value::String(details);
                }
                body
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.body())).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
