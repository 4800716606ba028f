//! Bounded invocation of external executables.
//!
//! Tools are located through the process `PATH` (or an explicit path from
//! `ToolConfig`); a missing executable is a runtime condition reported as
//! `ToolInvocation`, never a startup failure.

use crate::error::{Result, RevscopeError};
use crate::io::SafeBuffer;
use crate::timeout::{block_on_bounded, TimeoutConfig};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

const READ_CHUNK: usize = 8192;

/// Captured result of a finished tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Drain a child stream into a wiped-on-drop staging buffer.
async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<SafeBuffer> {
    let mut staged = SafeBuffer::new(0);
    let Some(mut reader) = reader else {
        return Ok(staged);
    };
    let mut chunk = SafeBuffer::new(READ_CHUNK);
    loop {
        let n = reader.read(chunk.as_mut_slice()).await?;
        if n == 0 {
            break;
        }
        staged.append(&chunk.as_slice()[..n]);
    }
    Ok(staged)
}

/// Run `program` with `args`, killing it if `timeout` expires.
///
/// Returns the output for any exit status; interpreting a nonzero code is
/// the caller's business. Spawn failures map to `ToolInvocation` and an
/// expired budget to `Timeout`.
pub fn run_tool<I, S>(program: &Path, args: I, timeout: TimeoutConfig) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program = %program.display(), operation = %timeout.operation, "Spawning tool");

    block_on_bounded(timeout, async move {
        let mut child = command.spawn().map_err(|e| {
            RevscopeError::ToolInvocation(format!("failed to spawn {}: {e}", program.display()))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout, stderr, status) = tokio::join!(drain(stdout), drain(stderr), child.wait());

        let status = status.map_err(|e| {
            RevscopeError::ToolInvocation(format!("failed to wait for {}: {e}", program.display()))
        })?;
        let read_err = |e: std::io::Error| {
            RevscopeError::ToolInvocation(format!(
                "failed to read output of {}: {e}",
                program.display()
            ))
        };
        let stdout = stdout.map_err(read_err)?;
        let stderr = stderr.map_err(read_err)?;

        debug!(program = %program.display(), status = %status, "Tool exited");
        Ok(ToolOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(stdout.as_slice()).into_owned(),
            stderr: String::from_utf8_lossy(stderr.as_slice()).into_owned(),
        })
    })
}
