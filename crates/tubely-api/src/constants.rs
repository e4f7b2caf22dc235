/// Prefix for all JSON API routes
pub const API_PREFIX: &str = "/api";

/// Multipart field carrying the video payload
pub const VIDEO_FIELD: &str = "video";

/// Multipart field carrying the thumbnail payload
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Name of the buffered upload inside its per-request scratch directory
pub const VIDEO_UPLOAD_FILENAME: &str = "tubely-upload.mp4";

/// Public path the local thumbnail assets are served from
pub const ASSETS_PATH: &str = "/assets";
