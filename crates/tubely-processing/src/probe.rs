//! Display aspect ratio inspection via ffprobe

use crate::command::run_tool;
use crate::error::ProcessingError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tubely_core::models::AspectRatio;

#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Classify the display aspect ratio of the first video stream in `path`
    async fn probe_aspect_ratio(&self, path: &Path) -> Result<AspectRatio, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    display_aspect_ratio: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// The first stream whose `codec_type` is "video" decides; a file without a
/// video stream, or a stream without a ratio, is `Other`.
pub fn parse_aspect_ratio(stdout: &[u8]) -> Result<AspectRatio, ProcessingError> {
    let output: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProcessingError::Parse {
            tool: "ffprobe".to_string(),
            message: e.to_string(),
        })?;

    let ratio = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.display_aspect_ratio.as_deref());

    Ok(AspectRatio::from_display_ratio(ratio))
}

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(process.executable.name = "ffprobe"))]
    async fn probe_aspect_ratio(&self, path: &Path) -> Result<AspectRatio, ProcessingError> {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = run_tool(cmd, "ffprobe", self.timeout).await?;
        let aspect = parse_aspect_ratio(&output.stdout)?;

        tracing::debug!(aspect_ratio = %aspect, "Probed display aspect ratio");
        Ok(aspect)
    }
}
