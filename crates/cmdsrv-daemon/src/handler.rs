// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validation and execution of `POST /cmd` requests.
//!
//! Kept free of axum types so the whole contract can be exercised with plain
//! bytes and a test [`Executor`].

use cmdsrv_core::{CmdRequest, ExecError, ExecutionRequest, ExecutionResult, Executor};
use cmdsrv_error::{ApiError, JSON_CONTENT_TYPE};
use tracing::{debug, error};

/// Message for a missing or non-JSON content type.
pub const UNSUPPORTED_MEDIA_TYPE_MSG: &str = "I only eat application/json requests mate";

/// Message for an empty request body.
pub const EMPTY_BODY_MSG: &str = "No data in the request body";

/// Validate a raw `/cmd` request and run it.
///
/// Checks run in order and the first failure wins:
/// 1. `content_type` must be exactly `application/json`;
/// 2. `raw_body` must be non-empty;
/// 3. `raw_body` must be a JSON object whose `cmd` is a non-empty array of
///    strings.
///
/// The executor is only reached once all three pass. A child that exits
/// non-zero is still `Ok`.
pub async fn handle_execute(
    raw_body: &[u8],
    content_type: Option<&str>,
    executor: &dyn Executor,
) -> Result<ExecutionResult, ApiError> {
    let request = validate(raw_body, content_type)?;
    executor.execute(&request).await.map_err(map_exec_error)
}

/// Steps 1–3 of [`handle_execute`].
pub fn validate(raw_body: &[u8], content_type: Option<&str>) -> Result<ExecutionRequest, ApiError> {
    if content_type != Some(JSON_CONTENT_TYPE) {
        return Err(ApiError::client(UNSUPPORTED_MEDIA_TYPE_MSG));
    }

    debug!(
        target: "cmdsrv.daemon",
        body = %String::from_utf8_lossy(raw_body),
        "got data from request"
    );
    if raw_body.is_empty() {
        return Err(ApiError::client(EMPTY_BODY_MSG));
    }

    decode_request(raw_body).map(|req| req.cmd).map_err(|message| {
        error!(
            target: "cmdsrv.daemon",
            error = %message,
            "could not get JSON object from request body"
        );
        ApiError::client(message)
    })
}

/// Decode the body into a [`CmdRequest`], insisting on a top-level object.
fn decode_request(raw_body: &[u8]) -> Result<CmdRequest, String> {
    let value: serde_json::Value = serde_json::from_slice(raw_body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("request body must be a JSON object".into());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn map_exec_error(err: ExecError) -> ApiError {
    match err {
        ExecError::Spawn { source, .. } => ApiError::spawn(source.to_string()),
        other @ ExecError::Wait(_) => ApiError::internal(other.to_string()),
    }
}
