//! OpenAPI documentation served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video hosting backend: upload videos and thumbnails for existing video records. Videos are probed for aspect ratio, remuxed for fast start and stored in an object store. All upload endpoints require a bearer JWT."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::video_get::get_video,
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::thumbnail_get::get_thumbnail,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Video,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and retrieval"),
        (name = "thumbnails", description = "Thumbnail upload and registry retrieval"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_upload_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/video_upload/{video_id}"));
        assert!(spec.paths.paths.contains_key("/api/thumbnail_upload/{video_id}"));
        assert!(spec.paths.paths.contains_key("/api/thumbnails/{video_id}"));
    }
}
