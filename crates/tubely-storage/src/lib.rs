//! Tubely Storage Library
//!
//! Object-store abstraction used by the upload pipeline, with S3, local
//! filesystem and in-memory backends.
//!
//! # Storage key format
//!
//! Video keys are `{aspect}/{random}` where `{aspect}` is one of `landscape`,
//! `portrait` or `other` and `{random}` is 32 random bytes encoded as
//! URL-safe base64 without padding. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod retry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_video_key, random_key_component};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::{MemoryStorage, PutCall};
pub use retry::{put_with_retry, RetryPolicy};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
