//! Video upload orchestration
//!
//! Order of effects for one request:
//! ownership check -> stream to scratch dir -> probe aspect ratio ->
//! fast-start repackage -> put under `{aspect}/{random}` -> persist
//! `bucket,key` -> resolve URL for the response. A failed persist deletes the
//! object it just stored.
//!
//! The scratch directory is owned by `ReceivedFile` and removed on drop, so it
//! is cleaned up on success, on every error path and when the request is
//! cancelled. Child processes are spawned with `kill_on_drop`.

use crate::constants::{VIDEO_FIELD, VIDEO_UPLOAD_FILENAME};
use crate::services::locator::VideoUrlResolver;
use crate::services::ownership::load_owned_video;
use crate::utils::upload::{receive_file_field, FieldRules};
use axum::extract::Multipart;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tubely_core::models::{AspectRatio, ObjectLocator, ProbeFailurePolicy, Video};
use tubely_core::AppError;
use tubely_db::VideoRepository;
use tubely_processing::{MediaProber, MediaRepackager};
use tubely_storage::{generate_video_key, put_with_retry, RetryPolicy, Storage};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct VideoUploadSettings {
    pub allowed_content_types: Vec<String>,
    pub max_bytes: usize,
    /// Parent for per-request scratch directories; system temp dir when unset
    pub temp_root: Option<PathBuf>,
    pub probe_failure_policy: ProbeFailurePolicy,
    pub retry: RetryPolicy,
}

pub struct VideoUploadService {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    repackager: Arc<dyn MediaRepackager>,
    resolver: VideoUrlResolver,
    settings: VideoUploadSettings,
}

impl VideoUploadService {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn MediaProber>,
        repackager: Arc<dyn MediaRepackager>,
        resolver: VideoUrlResolver,
        settings: VideoUploadSettings,
    ) -> Self {
        Self {
            videos,
            storage,
            prober,
            repackager,
            resolver,
            settings,
        }
    }

    #[tracing::instrument(skip(self, multipart), fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        multipart: Multipart,
    ) -> Result<Video, AppError> {
        let mut video = load_owned_video(self.videos.as_ref(), video_id, user_id).await?;

        let rules = FieldRules {
            name: VIDEO_FIELD,
            allowed_content_types: &self.settings.allowed_content_types,
            max_bytes: self.settings.max_bytes,
        };
        let received = receive_file_field(
            multipart,
            &rules,
            self.settings.temp_root.as_deref(),
            VIDEO_UPLOAD_FILENAME,
        )
        .await?;

        let aspect = self.classify(received.path()).await?;

        let processed = self.repackager.repackage_fast_start(received.path()).await?;

        let key = generate_video_key(aspect);
        // TODO: stream large files with a multipart object upload instead of reading them whole.
        let data = Bytes::from(tokio::fs::read(&processed).await?);
        let size = data.len();

        put_with_retry(
            self.storage.as_ref(),
            &key,
            data,
            &received.content_type,
            self.settings.retry,
        )
        .await?;

        video.video_url = Some(ObjectLocator::new(self.storage.bucket(), key.as_str()).to_string());
        video.updated_at = Utc::now();
        if let Err(e) = self.videos.update_video(&video).await {
            // Nothing references the new object yet.
            if let Err(cleanup) = self.storage.delete(&key).await {
                tracing::warn!(error = %cleanup, key = %key, "Failed to remove orphaned video object");
            }
            return Err(e);
        }

        tracing::info!(
            key = %key,
            aspect = %aspect,
            size_bytes = size,
            uploaded_bytes = received.size,
            "Video uploaded"
        );

        drop(received);
        self.resolver.resolve(video).await
    }

    async fn classify(&self, path: &Path) -> Result<AspectRatio, AppError> {
        match self.prober.probe_aspect_ratio(path).await {
            Ok(aspect) => Ok(aspect),
            Err(e) => match self.settings.probe_failure_policy {
                ProbeFailurePolicy::Lenient => {
                    tracing::warn!(error = %e, "Aspect ratio probe failed, classifying as other");
                    Ok(AspectRatio::Other)
                }
                ProbeFailurePolicy::Strict => Err(e.into()),
            },
        }
    }
}
