use crate::VideoRepository;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

/// Repository for video records
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            "SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at FROM videos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", video_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE videos SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = NOW() WHERE id = $1",
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", video.id)));
        }

        Ok(())
    }
}
