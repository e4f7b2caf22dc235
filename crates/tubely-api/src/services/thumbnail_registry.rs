//! Process-wide thumbnail store for the `registry` thumbnail strategy

use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub data: Bytes,
    pub media_type: String,
}

/// Thumbnails keyed by video id. A later upload for the same id replaces the
/// earlier one.
// TODO: bound memory with an LRU or TTL eviction policy; entries are never removed today.
#[derive(Default)]
pub struct ThumbnailRegistry {
    entries: RwLock<HashMap<Uuid, Thumbnail>>,
}

impl ThumbnailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, video_id: Uuid, thumbnail: Thumbnail) {
        let mut entries = self.entries.write().await;
        entries.insert(video_id, thumbnail);
        tracing::debug!(video_id = %video_id, entries = entries.len(), "Stored thumbnail in registry");
    }

    pub async fn get(&self, video_id: Uuid) -> Option<Thumbnail> {
        self.entries.read().await.get(&video_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
