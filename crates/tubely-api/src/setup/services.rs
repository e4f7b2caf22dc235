//! Wiring of upload services into `AppState`

use crate::auth::IdentityVerifier;
use crate::services::{
    ThumbnailRegistry, ThumbnailUploadService, VideoUploadService, VideoUploadSettings,
    VideoUrlResolver,
};
use crate::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{MediaProber, MediaRepackager};
use tubely_storage::{RetryPolicy, Storage};

/// Build shared state from configuration and already-constructed collaborators
pub fn build_state(
    config: Config,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    repackager: Arc<dyn MediaRepackager>,
    identity: Arc<dyn IdentityVerifier>,
) -> Arc<AppState> {
    let url_resolver = VideoUrlResolver::new(storage.clone(), config.video_url_strategy().clone());
    let thumbnails = Arc::new(ThumbnailRegistry::new());

    let video_uploads = VideoUploadService::new(
        videos.clone(),
        storage.clone(),
        prober,
        repackager,
        url_resolver.clone(),
        VideoUploadSettings {
            allowed_content_types: config.video_allowed_content_types().to_vec(),
            max_bytes: config.max_video_size_bytes(),
            temp_root: config.upload_temp_dir().map(PathBuf::from),
            probe_failure_policy: config.probe_failure_policy(),
            retry: RetryPolicy {
                max_retries: config.storage_put_max_retries(),
                base_delay: config.storage_put_retry_base(),
            },
        },
    );

    let thumbnail_uploads = ThumbnailUploadService::new(
        videos.clone(),
        thumbnails.clone(),
        url_resolver.clone(),
        config.thumbnail_strategy(),
        config.public_base_url(),
        config.assets_root(),
        config.thumbnail_allowed_content_types().to_vec(),
        config.max_thumbnail_size_bytes(),
    );

    tracing::info!(
        video_url_strategy = ?config.video_url_strategy(),
        thumbnail_strategy = ?config.thumbnail_strategy(),
        probe_failure_policy = ?config.probe_failure_policy(),
        "Upload services initialized"
    );

    Arc::new(AppState {
        config,
        videos,
        storage,
        identity,
        video_uploads,
        thumbnail_uploads,
        url_resolver,
        thumbnails,
    })
}
