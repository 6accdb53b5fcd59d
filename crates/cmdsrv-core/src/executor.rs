// SPDX-License-Identifier: MIT OR Apache-2.0
//! Child-process execution.
//!
//! [`ProcessExecutor`] runs the requested program directly, never through a
//! shell, inheriting the server's environment and working directory. stdin is
//! closed and both output streams are collected in memory until the child
//! exits.
//!
//! There is no timeout and no cancellation. A child that never exits keeps
//! its request waiting forever. Dropping the request future leaves the child
//! running unattended.

use crate::{ExecutionRequest, ExecutionResult};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Failures of [`Executor::execute`].
///
/// A child that ran and exited non-zero is *not* an error.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The OS could not create the process (missing binary, permission
    /// denied, resource exhaustion, ...).
    #[error("{source}")]
    Spawn {
        /// Executable that was requested.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The child started but collecting its output or exit status failed.
    #[error("failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runs one command to completion.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Spawn `request`, wait for it to terminate and return what it produced.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ExecError>;
}

/// [`Executor`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create an executor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ExecError> {
        info!(target: "cmdsrv.exec", command = %request, "preparing subprocess");

        let mut cmd = Command::new(request.program());
        cmd.args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|source| {
            error!(
                target: "cmdsrv.exec",
                command = %request,
                error = %source,
                "could not spawn command process"
            );
            ExecError::Spawn {
                program: request.program().to_string(),
                source,
            }
        })?;

        // Drains both pipes concurrently, then reaps the child.
        let output = child.wait_with_output().await.map_err(ExecError::Wait)?;
        let exit_code = exit_code(output.status);

        debug!(
            target: "cmdsrv.exec",
            command = %request,
            exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "command executed"
        );

        Ok(ExecutionResult {
            command: request.clone(),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
        })
    }
}

/// Exit code of a terminated child; `-signal` when killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
