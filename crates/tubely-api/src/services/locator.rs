//! Persisted locator -> client URL
//!
//! Records store video assets as `bucket,key`. What callers receive depends on
//! the deployment's `VideoUrlStrategy`; the stored value never changes.

use std::sync::Arc;
use tubely_core::models::{ObjectLocator, Video, VideoUrlStrategy};
use tubely_core::AppError;
use tubely_storage::Storage;

#[derive(Clone)]
pub struct VideoUrlResolver {
    storage: Arc<dyn Storage>,
    strategy: VideoUrlStrategy,
}

impl VideoUrlResolver {
    pub fn new(storage: Arc<dyn Storage>, strategy: VideoUrlStrategy) -> Self {
        Self { storage, strategy }
    }

    /// Resolve a single `bucket,key` locator into a fetchable URL
    pub async fn resolve_locator(&self, raw: &str) -> Result<String, AppError> {
        let locator: ObjectLocator = raw.parse()?;
        if locator.bucket != self.storage.bucket() {
            return Err(AppError::Io(format!(
                "video locator bucket '{}' does not match configured bucket '{}'",
                locator.bucket,
                self.storage.bucket()
            )));
        }

        match &self.strategy {
            VideoUrlStrategy::Presigned { ttl } => {
                let url = self.storage.presigned_url(&locator.key, *ttl).await?;
                Ok(url)
            }
            VideoUrlStrategy::StaticUrl {
                base_url: Some(base),
            } => Ok(format!("{}/{}", base.trim_end_matches('/'), locator.key)),
            VideoUrlStrategy::StaticUrl { base_url: None } => {
                Ok(self.storage.public_url(&locator.key))
            }
        }
    }

    /// Copy of `video` with its locator replaced by a client URL.
    /// Records without a video asset are returned unchanged.
    pub async fn resolve(&self, mut video: Video) -> Result<Video, AppError> {
        if let Some(raw) = video.video_url.take() {
            video.video_url = Some(self.resolve_locator(&raw).await?);
        }
        Ok(video)
    }

    /// Like `resolve`, but keeps the stored `bucket,key` when it cannot be
    /// resolved. For responses to writes that have already been persisted.
    pub async fn resolve_or_raw(&self, mut video: Video) -> Video {
        if let Some(raw) = video.video_url.clone() {
            match self.resolve_locator(&raw).await {
                Ok(url) => video.video_url = Some(url),
                Err(e) => {
                    tracing::warn!(error = %e, video_id = %video.id, locator = %raw, "Returning unresolved video locator")
                }
            }
        }
        video
    }
}
