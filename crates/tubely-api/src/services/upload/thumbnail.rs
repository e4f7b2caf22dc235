//! Thumbnail upload orchestration
//!
//! One `ThumbnailStrategy` is active per deployment and decides both where the
//! image bytes live and what the record's `thumbnail_url` holds.

use crate::constants::{API_PREFIX, ASSETS_PATH, THUMBNAIL_FIELD};
use crate::services::locator::VideoUrlResolver;
use crate::services::ownership::load_owned_video;
use crate::services::thumbnail_registry::{Thumbnail, ThumbnailRegistry};
use crate::utils::upload::{read_file_field, FieldRules, ReceivedBytes};
use axum::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tubely_core::models::{ThumbnailStrategy, Video};
use tubely_core::AppError;
use tubely_db::VideoRepository;
use tubely_storage::random_key_component;
use uuid::Uuid;

pub struct ThumbnailUploadService {
    videos: Arc<dyn VideoRepository>,
    registry: Arc<ThumbnailRegistry>,
    resolver: VideoUrlResolver,
    strategy: ThumbnailStrategy,
    public_base_url: String,
    assets_root: PathBuf,
    allowed_content_types: Vec<String>,
    max_bytes: usize,
}

impl ThumbnailUploadService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        registry: Arc<ThumbnailRegistry>,
        resolver: VideoUrlResolver,
        strategy: ThumbnailStrategy,
        public_base_url: impl Into<String>,
        assets_root: impl Into<PathBuf>,
        allowed_content_types: Vec<String>,
        max_bytes: usize,
    ) -> Self {
        Self {
            videos,
            registry,
            resolver,
            strategy,
            public_base_url: public_base_url.into(),
            assets_root: assets_root.into(),
            allowed_content_types,
            max_bytes,
        }
    }

    #[tracing::instrument(skip(self, multipart), fields(video_id = %video_id, user_id = %user_id, strategy = ?self.strategy))]
    pub async fn upload(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        multipart: Multipart,
    ) -> Result<Video, AppError> {
        let mut video = load_owned_video(self.videos.as_ref(), video_id, user_id).await?;

        let rules = FieldRules {
            name: THUMBNAIL_FIELD,
            allowed_content_types: &self.allowed_content_types,
            max_bytes: self.max_bytes,
        };
        let received = read_file_field(multipart, &rules).await?;
        let size = received.data.len();

        match self.strategy {
            ThumbnailStrategy::Registry => {
                video.thumbnail_url = Some(self.registry_url(video_id));
                self.persist(&mut video).await?;
                self.registry
                    .insert(
                        video_id,
                        Thumbnail {
                            data: received.data,
                            media_type: received.content_type,
                        },
                    )
                    .await;
            }
            ThumbnailStrategy::Inline => {
                video.thumbnail_url = Some(data_url(&received));
                self.persist(&mut video).await?;
            }
            ThumbnailStrategy::LocalFile => {
                self.store_local_file(&mut video, received).await?;
            }
        }

        tracing::info!(size_bytes = size, "Thumbnail uploaded");
        Ok(self.resolver.resolve_or_raw(video).await)
    }

    fn registry_url(&self, video_id: Uuid) -> String {
        format!(
            "{}{}/thumbnails/{}",
            self.public_base_url, API_PREFIX, video_id
        )
    }

    fn assets_url_prefix(&self) -> String {
        format!("{}{}/", self.public_base_url, ASSETS_PATH)
    }

    async fn persist(&self, video: &mut Video) -> Result<(), AppError> {
        video.updated_at = Utc::now();
        self.videos.update_video(video).await
    }

    /// Write `<assets_root>/<random>.<subtype>`, point the record at it, then
    /// remove whichever asset file the record referenced before.
    async fn store_local_file(
        &self,
        video: &mut Video,
        received: ReceivedBytes,
    ) -> Result<(), AppError> {
        let file_name = format!(
            "{}.{}",
            random_key_component(),
            extension_for(&received.content_type)
        );
        let path = self.assets_root.join(&file_name);

        tokio::fs::create_dir_all(&self.assets_root).await?;
        tokio::fs::write(&path, &received.data).await?;

        let previous = video.thumbnail_url.replace(format!(
            "{}{}",
            self.assets_url_prefix(),
            file_name
        ));

        if let Err(e) = self.persist(video).await {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::warn!(error = %cleanup, path = %path.display(), "Failed to remove orphaned thumbnail");
            }
            return Err(e);
        }

        if let Some(old_name) = previous
            .as_deref()
            .and_then(|url| url.strip_prefix(&self.assets_url_prefix()))
            .filter(|name| !name.contains('/') && !name.contains(".."))
        {
            let old_path = self.assets_root.join(old_name);
            match tokio::fs::remove_file(&old_path).await {
                Ok(()) => tracing::debug!(path = %old_path.display(), "Removed replaced thumbnail"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %old_path.display(), "Failed to remove replaced thumbnail")
                }
            }
        }

        Ok(())
    }
}

fn data_url(received: &ReceivedBytes) -> String {
    format!(
        "data:{};base64,{}",
        received.content_type,
        STANDARD.encode(&received.data)
    )
}

/// File extension from a `type/subtype` media type
fn extension_for(content_type: &str) -> &str {
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
}
