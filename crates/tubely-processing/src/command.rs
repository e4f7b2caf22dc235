//! Child process execution with a deadline

use crate::error::ProcessingError;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Run `cmd` to completion, failing on spawn errors, timeout or a non-zero exit.
///
/// The child is killed if the deadline passes or the returned future is
/// dropped (for example when the client disconnects).
pub async fn run_tool(
    mut cmd: Command,
    tool: &str,
    timeout: Duration,
) -> Result<Output, ProcessingError> {
    cmd.kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.map_err(|source| ProcessingError::Spawn {
            tool: tool.to_string(),
            source,
        })?,
        Err(_) => {
            tracing::warn!(
                process.executable.name = tool,
                timeout_secs = timeout.as_secs(),
                "External tool timed out"
            );
            return Err(ProcessingError::Timeout {
                tool: tool.to_string(),
                after: timeout,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!(
            process.executable.name = tool,
            status = %output.status,
            stderr = %stderr,
            "External tool failed"
        );
        return Err(ProcessingError::Failed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(output)
}
