//! Fast-start remux via ffmpeg

use crate::command::run_tool;
use crate::error::ProcessingError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

#[async_trait]
pub trait MediaRepackager: Send + Sync {
    /// Copy `input`'s streams into a new fast-start MP4 next to it and return its path.
    ///
    /// On error no output file is left behind.
    async fn repackage_fast_start(&self, input: &Path) -> Result<PathBuf, ProcessingError>;
}

/// Sibling output path: `<input>.processing`
pub fn processing_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(".processing");
    PathBuf::from(name)
}

pub struct FfmpegRepackager {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRepackager {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            timeout,
        }
    }
}

#[async_trait]
impl MediaRepackager for FfmpegRepackager {
    #[tracing::instrument(skip(self), fields(process.executable.name = "ffmpeg"))]
    async fn repackage_fast_start(&self, input: &Path) -> Result<PathBuf, ProcessingError> {
        let output_path = processing_output_path(input);
        let start = std::time::Instant::now();

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path);

        if let Err(e) = run_tool(cmd, "ffmpeg", self.timeout).await {
            // ffmpeg may have written part of the file before failing
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(e);
        }

        tracing::info!(
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Repackaged video for fast start"
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_is_sibling() {
        let out = processing_output_path(Path::new("/tmp/upload-1/tubely-upload.mp4"));
        assert_eq!(
            out,
            PathBuf::from("/tmp/upload-1/tubely-upload.mp4.processing")
        );
    }

    #[tokio::test]
    async fn failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tubely-upload.mp4");
        tokio::fs::write(&input, b"not really an mp4").await.unwrap();

        let repackager =
            FfmpegRepackager::new("/nonexistent/ffmpeg".to_string(), Duration::from_secs(5));
        let err = repackager.repackage_fast_start(&input).await.unwrap_err();

        assert!(matches!(err, ProcessingError::Spawn { .. }));
        assert!(!processing_output_path(&input).exists());
    }
}
