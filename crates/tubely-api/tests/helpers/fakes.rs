//! Stand-ins for the external media tools

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tubely_core::models::AspectRatio;
use tubely_processing::{processing_output_path, MediaProber, MediaRepackager, ProcessingError};

/// Reports a fixed aspect ratio, or fails when constructed with `None`.
/// A holding prober never returns, which leaves the request parked mid-pipeline.
pub struct FakeProber {
    result: Option<AspectRatio>,
    hold: bool,
    entered: Notify,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn new(result: Option<AspectRatio>) -> Self {
        Self {
            result,
            hold: false,
            entered: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn holding() -> Self {
        Self {
            hold: true,
            ..Self::new(None)
        }
    }

    /// Resolves once a probe call has started
    pub async fn entered(&self) {
        self.entered.notified().await
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe_aspect_ratio(&self, path: &Path) -> Result<AspectRatio, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe input should exist while probing");
        self.entered.notify_one();
        if self.hold {
            std::future::pending::<()>().await;
        }
        self.result.ok_or_else(|| ProcessingError::Failed {
            tool: "ffprobe".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        })
    }
}

/// Copies the input to the `.processing` sibling, or fails
pub struct FakeRepackager {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeRepackager {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaRepackager for FakeRepackager {
    async fn repackage_fast_start(&self, input: &Path) -> Result<PathBuf, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProcessingError::Failed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        let output = processing_output_path(input);
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}
