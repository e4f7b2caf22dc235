//! Video metadata repositories
//!
//! `VideoRepository` is the seam the upload pipeline talks to. `PgVideoRepository`
//! backs it with Postgres; `InMemoryVideoRepository` is used when no database is
//! configured and in tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryVideoRepository;
pub use postgres::PgVideoRepository;

use async_trait::async_trait;
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a video record by id; `Ok(None)` when it does not exist
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist the mutable fields of `video`, overwriting what is stored
    async fn update_video(&self, video: &Video) -> Result<(), AppError>;
}
