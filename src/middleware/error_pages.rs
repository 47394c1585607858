//! Generic error-page rendering.
//!
//! Installed as the outermost layer. Error responses that arrive without a
//! body get a small JSON page; anything that already has a body (including
//! licence rejections) is left alone.

use axum::{
    body::HttpBody,
    extract::Request,
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Payload rendered for an empty error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    /// Numeric status as text, e.g. `"404"`.
    pub status: String,
    /// Canonical reason phrase, e.g. `"Not Found"`.
    pub reason: String,
}

impl ErrorContext {
    /// Build the context for a status code.
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            status: status.as_str().to_string(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// Error-page middleware function.
///
/// Install with `axum::middleware::from_fn(render_error_pages)`.
pub async fn render_error_pages(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    if response.body().size_hint().exact() != Some(0) {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    (parts, Json(ErrorContext::from_status(status))).into_response()
}
