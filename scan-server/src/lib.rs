//! # Music Library Scan Server
//!
//! HTTP surface over the directory scanner and the metadata pipeline.
//!
//! ## Components
//!
//! - [`routes`]: the request handlers (`/api/library/scan`, `/api/health`,
//!   `/album-art/:filename`)
//! - [`middleware`]: CORS enforcement and request logging
//! - [`dto`]: the client-facing projection of scanner output
//! - [`error`]: HTTP status and body mapping for failures
//! - [`state`]: shared handles threaded through every handler

pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

/// Builds the application router with every route and middleware attached.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/api/library/scan", post(routes::library::scan_library))
        .route("/api/health", get(routes::health::health))
        .route("/album-art/:filename", get(routes::artwork::serve_album_art))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors,
        ))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}
