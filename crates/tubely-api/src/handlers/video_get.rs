use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::parse_video_id;
use crate::services::load_owned_video;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::models::Video;

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID (UUID)")
    ),
    responses(
        (status = 200, description = "Video with video_url resolved for the client", body = Video),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Stored locator could not be resolved", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_video"))]
pub async fn get_video(
    user: AuthUser,
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(state.videos.as_ref(), video_id, user.user_id).await?;
    let video = state.url_resolver.resolve(video).await?;
    Ok(Json(video))
}
