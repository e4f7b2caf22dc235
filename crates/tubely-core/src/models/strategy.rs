//! Deployment-wide strategies for turning stored assets into URLs.
//!
//! Each is chosen once from configuration and never mixed per request.

use std::str::FromStr;
use std::time::Duration;

/// How a persisted `bucket,key` video locator becomes a client URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoUrlStrategy {
    /// Time-limited presigned GET URL
    Presigned { ttl: Duration },
    /// `{base_url}/{key}` for CDN-fronted access, or the bucket's own public
    /// URL when no base is configured
    StaticUrl { base_url: Option<String> },
}

/// Where thumbnail bytes live and what the record's thumbnail locator holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStrategy {
    /// Process-wide in-memory map served by the thumbnail route
    Registry,
    /// `data:<media type>;base64,<payload>` stored on the record
    Inline,
    /// Random file name under the served assets directory
    LocalFile,
}

impl FromStr for ThumbnailStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "registry" | "memory" => Ok(ThumbnailStrategy::Registry),
            "inline" | "data_url" => Ok(ThumbnailStrategy::Inline),
            "local" | "local_file" => Ok(ThumbnailStrategy::LocalFile),
            _ => Err(anyhow::anyhow!("Invalid thumbnail strategy: {}", s)),
        }
    }
}

/// What the video pipeline does when the prober fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeFailurePolicy {
    /// Classify the upload as "other" and continue
    #[default]
    Lenient,
    /// Abort the upload with an IO error
    Strict,
}

impl FromStr for ProbeFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(ProbeFailurePolicy::Lenient),
            "strict" => Ok(ProbeFailurePolicy::Strict),
            _ => Err(anyhow::anyhow!("Invalid probe failure policy: {}", s)),
        }
    }
}
