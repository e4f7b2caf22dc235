//! Bounded retries for object-store uploads
//!
//! Re-putting the same bytes under the same key is idempotent, so transient
//! upload failures are retried with exponential backoff before surfacing.

use crate::traits::{Storage, StorageResult};
use bytes::Bytes;
use std::time::Duration;

/// Upper bound on a single backoff sleep
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry))
            .min(MAX_RETRY_BACKOFF)
    }
}

/// `Storage::put` with bounded retries on transient errors.
pub async fn put_with_retry(
    storage: &dyn Storage,
    storage_key: &str,
    data: Bytes,
    content_type: &str,
    policy: RetryPolicy,
) -> StorageResult<()> {
    let mut retry = 0;
    loop {
        // Bytes clones share the buffer.
        match storage.put(storage_key, data.clone(), content_type).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                let delay = policy.backoff(retry);
                tracing::warn!(
                    error = %e,
                    key = %storage_key,
                    retry = retry + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Object upload failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
