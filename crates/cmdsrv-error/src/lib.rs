// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical error taxonomy for the command server.
//!
//! Every failure the server reports is expressed as an [`ApiError`], whether
//! the request handler found it or the HTTP transport did, and is rendered
//! through a single function into the same wire envelope:
//!
//! ```json
//! {
//!     "error": {
//!         "status": 400,
//!         "statusstr": "Bad Request",
//!         "msg": "No data in the request body"
//!     }
//! }
//! ```
//!
//! Enable the `axum` feature to turn an [`ApiError`] directly into an axum
//! response.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod status;

pub use status::status_text;

use serde::{Deserialize, Serialize};

/// Media type of every error body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Closed set of failures surfaced over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The caller sent something we cannot act on (400).
    #[error("client error: {0}")]
    Client(String),

    /// The operating system refused to create the child process (500).
    #[error("spawn error: {0}")]
    Spawn(String),

    /// Unexpected fault inside the server (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Condition detected by the HTTP layer rather than the handler
    /// (401, 404, 405, 415, 504, ...).
    #[error("transport error {status}: {message}")]
    Transport {
        /// HTTP status chosen by the transport.
        status: u16,
        /// Description supplied by the transport.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for [`ApiError::Client`].
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client(message.into())
    }

    /// Shorthand for [`ApiError::Spawn`].
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn(message.into())
    }

    /// Shorthand for [`ApiError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Shorthand for [`ApiError::Transport`].
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Client(_) => 400,
            Self::Spawn(_) | Self::Internal(_) => 500,
            Self::Transport { status, .. } => *status,
        }
    }

    /// Human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Client(m) | Self::Spawn(m) | Self::Internal(m) => m,
            Self::Transport { message, .. } => message,
        }
    }

    /// Map to the canonical wire body. This is the only place where a variant
    /// is turned into `(status, label, message)`.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.status(), self.message())
    }

    /// Render the full envelope as pretty-printed JSON bytes.
    pub fn render(&self) -> Vec<u8> {
        ErrorEnvelope::from(self.to_body()).to_pretty_json()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Inner error object. Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code.
    pub status: u16,
    /// Canonical label for `status`.
    pub statusstr: String,
    /// Human-readable description.
    pub msg: String,
}

impl ErrorBody {
    /// Build a body, looking up the label in the status table.
    pub fn new(status: u16, msg: impl Into<String>) -> Self {
        Self {
            status,
            statusstr: status_text(status).to_string(),
            msg: msg.into(),
        }
    }
}

/// Top-level error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The wrapped error.
    pub error: ErrorBody,
}

impl From<ErrorBody> for ErrorEnvelope {
    fn from(error: ErrorBody) -> Self {
        Self { error }
    }
}

impl ErrorEnvelope {
    /// Serialize with a four-space indent.
    pub fn to_pretty_json(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        // Plain structs of integers and strings; serialization into a Vec
        // cannot fail.
        if self.serialize(&mut ser).is_err() {
            out.clear();
        }
        out
    }
}

/// Render an error body for an arbitrary status code and message.
///
/// Used for conditions that never passed through an [`ApiError`], such as a
/// bare status produced by the HTTP framework.
pub fn to_error_response(status: u16, message: &str) -> Vec<u8> {
    ErrorEnvelope::from(ErrorBody::new(status, message)).to_pretty_json()
}

// ---------------------------------------------------------------------------
// axum integration
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
mod into_response {
    use super::{ApiError, JSON_CONTENT_TYPE};
    use axum::http::{StatusCode, header};
    use axum::response::{IntoResponse, Response};

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status =
                StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                self.render(),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
