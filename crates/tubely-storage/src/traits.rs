//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object-store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// The backend refused the request (credentials, permissions, preconditions)
    #[error("Rejected by storage backend: {0}")]
    Rejected(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether repeating the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_) | StorageError::BackendError(_) | StorageError::IoError(_)
        )
    }
}

impl From<StorageError> for tubely_core::AppError {
    fn from(err: StorageError) -> Self {
        tubely_core::AppError::Storage(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Every backend is bound to a single bucket for its whole lifetime; the
/// bucket name is what ends up in persisted `bucket,key` locators.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key` with the given content type, replacing any existing object
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Generate a presigned/temporary GET URL for direct access
    async fn presigned_url(&self, storage_key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Permanent URL for an object, valid when the bucket allows public reads
    fn public_url(&self, storage_key: &str) -> String;

    /// Bucket this backend writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape a key namespace.
pub(crate) fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {:?}",
            storage_key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_keys() {
        assert!(validate_key("landscape/abc").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn converts_to_storage_app_error() {
        let err: tubely_core::AppError = StorageError::UploadFailed("503".into()).into();
        assert!(matches!(err, tubely_core::AppError::Storage(_)));
    }

    #[test]
    fn transient_classification() {
        assert!(StorageError::UploadFailed("timeout".into()).is_transient());
        assert!(!StorageError::InvalidKey("..".into()).is_transient());
        assert!(!StorageError::ConfigError("bucket".into()).is_transient());
        assert!(!StorageError::Rejected("AccessDenied".into()).is_transient());
    }
}
