//! Album art endpoint.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::error;

use core_metadata::artwork::content_type_for;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Artwork files never change once written, so clients may cache forever.
const CACHE_CONTROL_VALUE: &str = "public, max-age=31536000, immutable";

/// GET /album-art/:filename
///
/// Serves a cover image previously extracted during a scan. The store only
/// resolves bare filenames, so traversal segments in the path fall out as
/// a plain 404.
pub async fn serve_album_art(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let data = state
        .art_store
        .load(&filename)
        .await
        .map_err(|err| {
            error!("Failed to load album art {}: {}", filename, err);
            ApiError::internal(err.to_string(), state.config.environment)
        })?
        .ok_or_else(|| ApiError::NotFound("Album art not found".to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&filename)),
        (header::CACHE_CONTROL, CACHE_CONTROL_VALUE),
    ];

    Ok((headers, data).into_response())
}
