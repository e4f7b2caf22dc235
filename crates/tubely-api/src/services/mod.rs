//! Upload pipeline services
//!
//! Handlers stay thin: they parse the request and hand off to these services,
//! which own the ordering of side effects (temp file, probe, repackage, put,
//! persist) and the mapping of every collaborator failure onto `AppError`.

pub mod locator;
pub mod ownership;
pub mod thumbnail_registry;
pub mod upload;

pub use locator::VideoUrlResolver;
pub use ownership::load_owned_video;
pub use thumbnail_registry::{Thumbnail, ThumbnailRegistry};
pub use upload::{ThumbnailUploadService, VideoUploadService, VideoUploadSettings};
