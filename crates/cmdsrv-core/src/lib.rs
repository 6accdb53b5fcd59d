// SPDX-License-Identifier: MIT OR Apache-2.0
//! cmdsrv-core
//!
//! The execution contract of the command server: what a caller asks to run
//! ([`ExecutionRequest`]), what comes back once the child has terminated
//! ([`ExecutionResult`]), the JSON envelopes exchanged on `POST /cmd`, and the
//! [`Executor`] seam with its process-backed implementation.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Child-process execution.
pub mod executor;

pub use executor::{ExecError, Executor, ProcessExecutor};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ExecutionRequest
// ---------------------------------------------------------------------------

/// An executable followed by its arguments.
///
/// Always holds at least one element. The only way in is
/// [`TryFrom<Vec<String>>`], which serde uses as well, so a value that exists
/// has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ExecutionRequest(Vec<String>);

/// Rejection of an empty command vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cmd must contain at least the executable to run")]
pub struct EmptyCommand;

impl TryFrom<Vec<String>> for ExecutionRequest {
    type Error = EmptyCommand;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(EmptyCommand);
        }
        Ok(Self(value))
    }
}

impl From<ExecutionRequest> for Vec<String> {
    fn from(value: ExecutionRequest) -> Self {
        value.0
    }
}

impl ExecutionRequest {
    /// Build a request from anything yielding strings.
    pub fn new<I, S>(parts: I) -> Result<Self, EmptyCommand>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(parts.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    /// The executable name or path.
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments passed after the executable.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// The full vector, executable first.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

/// Outcome of a child process that ran to completion.
///
/// `exit_code` is reported as-is; a non-zero value is still a successful
/// execution. On Unix a child terminated by signal `N` reports `-N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The request that was executed.
    pub command: ExecutionRequest,
    /// Everything the child wrote to stdout.
    pub stdout: Vec<u8>,
    /// Everything the child wrote to stderr.
    pub stderr: Vec<u8>,
    /// Raw exit status.
    pub exit_code: i32,
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Body of `POST /cmd`.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdRequest {
    /// Executable followed by its arguments.
    pub cmd: ExecutionRequest,
}

/// Successful response of `POST /cmd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdResponse {
    /// Echo of the executed command.
    pub cmd: Vec<String>,
    /// Captured stdout as text.
    pub stdout: String,
    /// Captured stderr as text.
    pub stderr: String,
    /// Exit code of the child.
    pub retval: i32,
}

impl CmdResponse {
    /// The echoed command joined with single spaces.
    pub fn command_line(&self) -> String {
        self.cmd.join(" ")
    }
}

impl From<ExecutionResult> for CmdResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            cmd: result.command.into(),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            retval: result.exit_code,
        }
    }
}
