use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::parse_video_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tubely_core::AppError;

/// Serve a thumbnail held by the in-memory registry
#[utoipa::path(
    get,
    path = "/api/thumbnails/{video_id}",
    tag = "thumbnails",
    params(
        ("video_id" = String, Path, description = "Video ID (UUID)")
    ),
    responses(
        (status = 200, description = "Raw image bytes with the uploaded content type"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "No thumbnail stored for this video", body = ErrorResponse)
    )
)]
pub async fn get_thumbnail(
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let thumbnail = state
        .thumbnails
        .get(video_id)
        .await
        .ok_or_else(|| AppError::NotFound("Thumbnail not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, thumbnail.media_type)],
        thumbnail.data,
    ))
}
