// SPDX-License-Identifier: MIT OR Apache-2.0
//! cmdsrv-client
//!
//! Async client for the command server HTTP API.
//!
//! ```no_run
//! # async fn demo() -> Result<(), cmdsrv_client::ClientError> {
//! let client = cmdsrv_client::CmdsrvClient::new("http://127.0.0.1:8055");
//! let out = client.run(["ls", "-a", "-l"]).await?;
//! println!("{} exited with {}", out.command_line(), out.retval);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![warn(missing_docs)]

use cmdsrv_core::{CmdRequest, CmdResponse, EmptyCommand, ExecutionRequest};
use cmdsrv_error::{ErrorBody, ErrorEnvelope, JSON_CONTENT_TYPE};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`CmdsrvClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than `200 OK`.
    #[error("cmdsrv responded {status}: {}", server_message(.body, .error))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
        /// Decoded error envelope, when the body was one.
        error: Option<ErrorBody>,
    },

    /// A `200 OK` body did not match the expected shape.
    #[error("could not decode cmdsrv response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The command to send was empty.
    #[error(transparent)]
    InvalidCommand(#[from] EmptyCommand),
}

fn server_message<'a>(body: &'a str, error: &'a Option<ErrorBody>) -> &'a str {
    error.as_ref().map_or(body, |e| e.msg.as_str())
}

impl ClientError {
    /// HTTP status of a [`ClientError::Server`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Decoded error envelope of a [`ClientError::Server`] error.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Server { error, .. } => error.as_ref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw exchange
// ---------------------------------------------------------------------------

/// A response as received, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for `status`, empty when unknown.
    pub reason: String,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// `true` for `200 OK`, the only status the API uses for success.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Turn a non-200 response into a [`ClientError::Server`].
    pub fn into_error(self) -> ClientError {
        let error = serde_json::from_str::<ErrorEnvelope>(&self.body)
            .ok()
            .map(|env| env.error);
        ClientError::Server {
            status: self.status,
            body: self.body,
            error,
        }
    }
}

/// POST `body` to `url` as `application/json` and collect the response.
///
/// Only transport failures are errors; any HTTP status is returned.
pub async fn post_json(
    http: &reqwest::Client,
    url: &str,
    body: impl Into<reqwest::Body>,
) -> Result<RawResponse, reqwest::Error> {
    let resp = http
        .post(url)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(body)
        .send()
        .await?;
    let status = resp.status();
    let body = resp.text().await?;
    Ok(RawResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Typed client bound to one server.
///
/// No request timeout is applied by default because `/cmd` blocks until the
/// child exits. Inject a configured [`reqwest::Client`] through
/// [`CmdsrvClient::with_http`] to add one.
#[derive(Debug, Clone)]
pub struct CmdsrvClient {
    base_url: String,
    http: reqwest::Client,
}

impl CmdsrvClient {
    /// Client for the server rooted at `base_url`, e.g. `http://host:8055`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Same as [`CmdsrvClient::new`] with a caller-supplied HTTP client.
    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, http }
    }

    /// Server root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /status`.
    pub async fn status(&self) -> Result<String, ClientError> {
        self.get_text("/status").await
    }

    /// `GET /version`.
    pub async fn version(&self) -> Result<String, ClientError> {
        self.get_text("/version").await
    }

    /// `POST /cmd` and wait for the child to finish.
    ///
    /// A non-zero `retval` is a successful call; only non-200 responses and
    /// transport failures are errors.
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<CmdResponse, ClientError> {
        let url = format!("{}/cmd", self.base_url);
        let payload = serde_json::to_vec(&CmdRequest {
            cmd: request.clone(),
        })?;
        info!(target: "cmdsrv.client", url = %url, cmd = %request, "posting command");

        let raw = post_json(&self.http, &url, payload).await?;
        info!(target: "cmdsrv.client", cmd = %request, status = raw.status, "command response received");
        if !raw.is_success() {
            let err = raw.into_error();
            error!(target: "cmdsrv.client", cmd = %request, error = %err, "cmdsrv rejected command");
            return Err(err);
        }
        debug!(target: "cmdsrv.client", body = %raw.body, "cmdsrv response body");
        Ok(serde_json::from_str(&raw.body)?)
    }

    /// Build an [`ExecutionRequest`] from `parts` and [`execute`](Self::execute) it.
    pub async fn run<I, S>(&self, parts: I) -> Result<CmdResponse, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = ExecutionRequest::new(parts)?;
        self.execute(&request).await
    }

    async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let raw = RawResponse {
            status,
            reason: String::new(),
            body,
        };
        if raw.is_success() {
            Ok(raw.body)
        } else {
            Err(raw.into_error())
        }
    }
}
