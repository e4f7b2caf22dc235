pub mod thumbnail;
pub mod video;

pub use thumbnail::ThumbnailUploadService;
pub use video::{VideoUploadService, VideoUploadSettings};
