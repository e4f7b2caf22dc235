use tubely_core::{models::Video, AppError};
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Load a video and require that `user_id` owns it.
///
/// Missing records are `NotFound`; records owned by someone else are `Forbidden`.
pub async fn load_owned_video(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(user_id) {
        tracing::warn!(
            video_id = %video_id,
            owner_id = %video.user_id,
            user_id = %user_id,
            "Rejected access to video owned by another user"
        );
        return Err(AppError::Forbidden("Not the owner of this video".to_string()));
    }

    Ok(video)
}
