pub mod health;
pub mod thumbnail_get;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

use tubely_core::AppError;
use uuid::Uuid;

/// Parse the `{video_id}` path segment
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidIdentifier("Invalid ID".to_string()))
}
