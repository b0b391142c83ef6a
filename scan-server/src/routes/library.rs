//! Library scan endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::{debug, error};

use core_scanner::ScanError;

use crate::dto::ScanResponse;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// POST /api/library/scan
///
/// Walks the directory named in the request body and returns the metadata
/// for every audio file found. The body must be a JSON object with a
/// non-empty string `directory` field; anything else is rejected up front.
pub async fn scan_library(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<ScanResponse>> {
    let Some(Json(body)) = body else {
        return Err(ApiError::InvalidBody);
    };
    if !body.is_object() {
        return Err(ApiError::InvalidBody);
    }

    let directory = match body.get("directory").and_then(Value::as_str) {
        Some(directory) if !directory.is_empty() => directory.to_string(),
        _ => return Err(ApiError::MissingDirectory),
    };

    let outcome = match state.scanner.scan(&directory).await {
        Ok(outcome) => outcome,
        Err(err) => {
            match &err {
                ScanError::WalkFailed { .. } => error!("Error during directory scan: {}", err),
                _ => error!("Directory access error: {}", err),
            }
            return Err(ApiError::from_scan_error(err, state.config.environment));
        }
    };

    debug!(
        "Scan {} returning {} records to the client",
        outcome.scan_id,
        outcome.files.len()
    );

    Ok(Json(ScanResponse::from(outcome)))
}
