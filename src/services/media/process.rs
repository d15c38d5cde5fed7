use std::ffi::OsStr;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0} not found on PATH")]
    NotFound(String),

    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} timed out after {limit:?}")]
    TimedOut { tool: String, limit: Duration },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Runs an external tool to completion within `limit`.
///
/// The child is killed when the limit expires or when the calling future is
/// dropped. A non-zero exit is returned as [`ToolError::Failed`], so callers
/// only ever see output from a successful run.
pub async fn run_tool<I, S>(program: &OsStr, args: I, limit: Duration) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = program.to_string_lossy().to_string();

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!("Running {} with timeout {:?}", tool, limit);

    let output = match tokio::time::timeout(limit, command.output()).await {
        Err(_) => return Err(ToolError::TimedOut { tool, limit }),
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ToolError::NotFound(tool));
        }
        Ok(Err(source)) => return Err(ToolError::Io { tool, source }),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ToolError::Failed {
            tool,
            status: output.status,
            stderr,
        });
    }

    Ok(output)
}
