use crate::VideoRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

/// Process-local video store
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, Video>>,
    updates: AtomicUsize,
    update_failures_remaining: AtomicUsize,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, replacing any existing one with the same id
    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id, video);
    }

    /// Make the next `n` `update_video` calls fail with a pool timeout
    pub fn fail_next_updates(&self, n: usize) {
        self.update_failures_remaining.store(n, Ordering::SeqCst);
    }

    /// Number of successful `update_video` calls
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let injected = self
            .update_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(sqlx::Error::PoolTimedOut.into());
        }

        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;

        *stored = Video {
            updated_at: Utc::now(),
            ..video.clone()
        };
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
