use std::time::Duration;
use thiserror::Error;
use tubely_core::AppError;

/// Failures from external media tools
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        AppError::Io(err.to_string())
    }
}
