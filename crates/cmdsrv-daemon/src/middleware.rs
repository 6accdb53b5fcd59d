// SPDX-License-Identifier: MIT OR Apache-2.0
//! Middleware stack for the cmdsrv HTTP API.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cmdsrv_error::{ApiError, JSON_CONTENT_TYPE, status_text, to_error_response};
use std::any::Any;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Upper bound on a framework-generated error body we are willing to read
/// back when rewriting it.
const MAX_BARE_BODY: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// RequestId middleware
// ---------------------------------------------------------------------------

/// A unique request identifier, available as an Axum extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

/// Axum middleware that generates a [`RequestId`] for each request and sets
/// the `X-Request-Id` response header.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = RequestId(Uuid::new_v4());
    req.extensions_mut().insert(id);
    let mut resp = next.run(req).await;
    // A hyphenated UUID is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&id.0.to_string()) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

// ---------------------------------------------------------------------------
// RequestLogger
// ---------------------------------------------------------------------------

/// Axum middleware that logs method, path, status code, and duration for each
/// request using [`tracing`] structured fields.
pub struct RequestLogger;

impl RequestLogger {
    /// Axum-compatible handler function.
    pub async fn layer(req: Request, next: Next) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let request_id = req.extensions().get::<RequestId>().map(|id| id.0);
        let start = Instant::now();

        let resp = next.run(req).await;

        info!(
            target: "cmdsrv.http",
            http_method = %method,
            http_path = %path,
            http_status = resp.status().as_u16(),
            http_duration_ms = start.elapsed().as_millis() as u64,
            request_id = ?request_id,
            "request completed"
        );

        resp
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Rewrite bare error responses produced by the framework (unknown route,
/// wrong method, body too large, ...) into the canonical JSON error body.
///
/// The original body text becomes the message; an empty body falls back to
/// the status label. Responses that are already JSON pass through untouched.
pub async fn error_envelope_middleware(req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(resp.headers()) {
        return resp;
    }

    let (mut parts, body) = resp.into_parts();
    let text = match to_bytes(body, MAX_BARE_BODY).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };
    let message = if text.is_empty() {
        status_text(status.as_u16()).to_string()
    } else {
        text
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    Response::from_parts(parts, Body::from(to_error_response(status.as_u16(), &message)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(JSON_CONTENT_TYPE))
}

// ---------------------------------------------------------------------------
// Panic capture
// ---------------------------------------------------------------------------

/// Response used by [`tower_http::catch_panic::CatchPanicLayer`] when a
/// handler panics.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(target: "cmdsrv.http", panic = %detail, "request handler panicked");
    ApiError::internal(detail).into_response()
}
