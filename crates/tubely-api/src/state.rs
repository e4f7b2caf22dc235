//! Shared application state handed to every handler.

use crate::auth::IdentityVerifier;
use crate::services::{
    ThumbnailRegistry, ThumbnailUploadService, VideoUploadService, VideoUrlResolver,
};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_storage::Storage;

pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub video_uploads: VideoUploadService,
    pub thumbnail_uploads: ThumbnailUploadService,
    pub url_resolver: VideoUrlResolver,
    pub thumbnails: Arc<ThumbnailRegistry>,
}
