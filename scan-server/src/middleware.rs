//! Request middleware: CORS enforcement and request logging.
//!
//! CORS follows the origin allow-list from the server configuration.
//! Requests without an `Origin` header (curl, same-origin, server-to-server)
//! pass through untouched. Allowed origins are echoed back with credential
//! support, and preflight `OPTIONS` requests are answered directly without
//! reaching the routes. Disallowed origins get no CORS headers, which leaves
//! the browser to reject the response.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::state::AppState;

/// Methods advertised in preflight responses.
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Headers advertised in preflight responses.
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// How one request's origin relates to the allow-list.
#[derive(Debug, PartialEq, Eq)]
enum OriginPolicy {
    /// No `Origin` header; not a cross-origin request.
    NoOrigin,
    /// Origin is on the allow-list and gets echoed back.
    Allowed(String),
    /// Origin is not on the allow-list.
    Denied(String),
}

fn classify_origin(origin: Option<&str>, allowed: &[String]) -> OriginPolicy {
    match origin {
        None => OriginPolicy::NoOrigin,
        Some(origin) if allowed.iter().any(|entry| entry == origin) => {
            OriginPolicy::Allowed(origin.to_string())
        }
        Some(origin) => OriginPolicy::Denied(origin.to_string()),
    }
}

/// Applies the CORS policy around every route.
pub async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let policy = classify_origin(origin, &state.config.allowed_origins);
    let preflight = request.method() == Method::OPTIONS;

    match policy {
        OriginPolicy::NoOrigin => next.run(request).await,
        OriginPolicy::Allowed(origin) => {
            if preflight {
                preflight_response(&origin)
            } else {
                let mut response = next.run(request).await;
                apply_cors_headers(response.headers_mut(), &origin);
                response
            }
        }
        OriginPolicy::Denied(origin) => {
            warn!(
                "The CORS policy for this site does not allow access from the specified Origin: {}",
                origin
            );
            if preflight {
                StatusCode::FORBIDDEN.into_response()
            } else {
                next.run(request).await
            }
        }
    }
}

/// Answers a preflight request without invoking the route.
fn preflight_response(origin: &str) -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    apply_cors_headers(headers, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    // The origin came off a request header, so it is a valid header value.
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}

/// Logs every request before it is handled.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none");

    info!("{} {} (Origin: {})", request.method(), request.uri(), origin);

    next.run(request).await
}

// =============================================================================
// Tests
// =============================================================================
