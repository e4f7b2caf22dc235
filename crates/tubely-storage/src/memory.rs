//! In-memory object store
//!
//! Keeps every object in a process-local map and records each successful
//! `put`, so callers can assert on exactly what was uploaded.

use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// One recorded `put` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
pub struct MemoryStorage {
    bucket: String,
    objects: RwLock<HashMap<String, (Bytes, String)>>,
    puts: RwLock<Vec<PutCall>>,
    attempts: AtomicUsize,
    failures_remaining: AtomicUsize,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Make the next `n` put attempts fail with a transient upload error
    pub fn fail_next_puts(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    /// Successful puts, in order
    pub async fn put_calls(&self) -> Vec<PutCall> {
        self.puts.read().await.clone()
    }

    /// Every put attempt, including failed ones
    pub fn put_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Stored object bytes and content type
    pub async fn object(&self, storage_key: &str) -> Option<(Bytes, String)> {
        self.objects.read().await.get(storage_key).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                storage_key
            )));
        }

        let size = data.len();
        self.objects
            .write()
            .await
            .insert(storage_key.to_string(), (data, content_type.to_string()));
        self.puts.write().await.push(PutCall {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            size,
        });

        tracing::debug!(key = %storage_key, size_bytes = size, "Memory upload successful");
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        self.objects.write().await.remove(storage_key);
        Ok(())
    }

    async fn presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        Ok(format!(
            "{}?expires_in={}",
            self.public_url(storage_key),
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("memory://{}/{}", self.bucket, storage_key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
