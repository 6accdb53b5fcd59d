// SPDX-License-Identifier: MIT OR Apache-2.0
//! HTTP front end of the command server.
//!
//! Routes:
//!
//! | Method | Path       | Response                                           |
//! |--------|------------|----------------------------------------------------|
//! | GET    | `/status`  | `online`                                           |
//! | GET    | `/version` | `version: … changeSet:… changeSetDate: …`          |
//! | POST   | `/cmd`     | `{"cmd": […], "stdout": …, "stderr": …, "retval": …}` |
//!
//! Every error, including unknown routes and wrong methods, is rendered as
//! `{"error": {"status", "statusstr", "msg"}}`.
//!
//! `/cmd` waits for the child to exit with no timeout. Abandoning the HTTP
//! request does not kill the child.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// `/cmd` validation and execution, independent of axum.
pub mod handler;
/// Middleware stack for the daemon HTTP API.
pub mod middleware;
/// Tracing subscriber installation.
pub mod telemetry;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Uri, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use cmdsrv_config::{BuildInfo, CmdsrvConfig};
use cmdsrv_core::{CmdResponse, Executor, ProcessExecutor};
use cmdsrv_error::ApiError;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::debug;

/// Shared, read-only state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Build metadata served by `/version`.
    pub build: BuildInfo,
    /// Runs `/cmd` requests.
    pub executor: Arc<dyn Executor>,
}

impl AppState {
    /// State for a configuration, executing real child processes.
    pub fn new(config: &CmdsrvConfig) -> Self {
        Self {
            build: config.cmdsrv.clone(),
            executor: Arc::new(ProcessExecutor::new()),
        }
    }

    /// Replace the executor.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(cmd_status))
        .route("/version", get(cmd_version))
        // Content type is judged before size, and commands are not capped.
        .route("/cmd", post(cmd_execute).layer(DefaultBodyLimit::disable()))
        .fallback(cmd_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(axum_middleware::from_fn(
            middleware::error_envelope_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::RequestLogger::layer))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
}

async fn cmd_status() -> &'static str {
    "online"
}

async fn cmd_version(State(state): State<Arc<AppState>>) -> String {
    state.build.version_line()
}

async fn cmd_execute(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CmdResponse>, ApiError> {
    debug!(
        target: "cmdsrv.daemon",
        content_length = ?headers.get(header::CONTENT_LENGTH),
        "received /cmd request"
    );
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let result = handler::handle_execute(&body, content_type, state.executor.as_ref()).await?;
    Ok(Json(CmdResponse::from(result)))
}

async fn cmd_not_found(uri: Uri) -> ApiError {
    ApiError::transport(404, format!("Not found: '{}'", uri.path()))
}
