use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::parse_video_id;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::models::Video;

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID (UUID)")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `video`: an MP4 file"),
    responses(
        (status = 200, description = "Video uploaded; video_url resolved for the client", body = Video),
        (status = 400, description = "Invalid ID, missing field or unsupported media type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing, storage or persistence failure", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    user: AuthUser,
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = state
        .video_uploads
        .upload(video_id, user.user_id, multipart)
        .await?;
    Ok(Json(video))
}
