//! Configuration module
//!
//! Environment-driven configuration for the API, storage backends and the
//! upload pipeline. `.env` files are honoured through dotenvy.

use std::env;
use std::time::Duration;

use crate::models::{ProbeFailurePolicy, ThumbnailStrategy, VideoUrlStrategy};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const PRESIGN_TTL_SECS: u64 = 600;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
const STORAGE_PUT_MAX_RETRIES: u32 = 2;
const STORAGE_PUT_RETRY_BASE_MS: u64 = 200;
const DEFAULT_BUCKET: &str = "tubely";
const JWT_ISSUER: &str = "tubely-access";

/// Settings shared by every surface of the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// "json" switches the log output to JSON lines
    pub log_format: String,
    /// Externally visible origin, used for thumbnail and asset URLs
    pub public_base_url: String,
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    // Metadata store. Without a URL records are kept in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Object store
    pub storage_backend: StorageBackend,
    pub bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub storage_put_max_retries: u32,
    pub storage_put_retry_base_ms: u64,
    // Locator strategies
    pub video_url_strategy: VideoUrlStrategy,
    pub thumbnail_strategy: ThumbnailStrategy,
    pub assets_root: String,
    // Upload limits
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    // External media tools
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub media_tool_timeout_secs: u64,
    pub probe_failure_policy: ProbeFailurePolicy,
    /// Parent directory for per-request scratch directories; system temp dir when unset
    pub upload_temp_dir: Option<String>,
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| JWT_ISSUER.to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let video_url_strategy = match env::var("VIDEO_URL_STRATEGY")
            .unwrap_or_else(|_| "presigned".to_string())
            .to_lowercase()
            .as_str()
        {
            "presigned" => VideoUrlStrategy::Presigned {
                ttl: Duration::from_secs(
                    env::var("PRESIGN_TTL_SECS")
                        .unwrap_or_else(|_| PRESIGN_TTL_SECS.to_string())
                        .parse()
                        .unwrap_or(PRESIGN_TTL_SECS),
                ),
            },
            "cdn" => VideoUrlStrategy::StaticUrl {
                base_url: Some(env::var("CDN_BASE_URL").map_err(|_| {
                    anyhow::anyhow!("CDN_BASE_URL must be set when VIDEO_URL_STRATEGY=cdn")
                })?),
            },
            "public" => VideoUrlStrategy::StaticUrl { base_url: None },
            other => return Err(anyhow::anyhow!("Invalid video URL strategy: {}", other)),
        };

        let thumbnail_strategy = match env::var("THUMBNAIL_STRATEGY") {
            Ok(s) => s.parse()?,
            Err(_) => ThumbnailStrategy::Registry,
        };

        let probe_failure_policy = match env::var("PROBE_FAILURE_POLICY") {
            Ok(s) => s.parse()?,
            Err(_) => ProbeFailurePolicy::default(),
        };

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let max_thumbnail_size_mb = env::var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|_| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        Ok(ServiceConfig {
            base,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            storage_put_max_retries: env::var("STORAGE_PUT_MAX_RETRIES")
                .unwrap_or_else(|_| STORAGE_PUT_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(STORAGE_PUT_MAX_RETRIES),
            storage_put_retry_base_ms: env::var("STORAGE_PUT_RETRY_BASE_MS")
                .unwrap_or_else(|_| STORAGE_PUT_RETRY_BASE_MS.to_string())
                .parse()
                .unwrap_or(STORAGE_PUT_RETRY_BASE_MS),
            video_url_strategy,
            thumbnail_strategy,
            assets_root: env::var("ASSETS_ROOT").unwrap_or_else(|_| "./assets".to_string()),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            max_thumbnail_size_bytes: max_thumbnail_size_mb * 1024 * 1024,
            video_allowed_content_types: env_list("VIDEO_ALLOWED_CONTENT_TYPES", "video/mp4"),
            thumbnail_allowed_content_types: env_list(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/png",
            ),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            media_tool_timeout_secs: env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .unwrap_or_else(|_| MEDIA_TOOL_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MEDIA_TOOL_TIMEOUT_SECS),
            probe_failure_policy,
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR").ok(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.bucket.is_empty() || self.bucket.contains(',') {
            return Err(anyhow::anyhow!(
                "S3_BUCKET must be non-empty and must not contain ','"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if self.video_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }
        if self.thumbnail_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.media_tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!("MEDIA_TOOL_TIMEOUT_SECS must be positive"));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.inner().base.jwt_issuer
    }

    pub fn log_json(&self) -> bool {
        self.inner().base.log_format == "json"
    }

    pub fn public_base_url(&self) -> &str {
        self.inner().base.public_base_url.trim_end_matches('/')
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn bucket(&self) -> &str {
        &self.inner().bucket
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn storage_put_max_retries(&self) -> u32 {
        self.inner().storage_put_max_retries
    }

    pub fn storage_put_retry_base(&self) -> Duration {
        Duration::from_millis(self.inner().storage_put_retry_base_ms)
    }

    pub fn video_url_strategy(&self) -> &VideoUrlStrategy {
        &self.inner().video_url_strategy
    }

    pub fn thumbnail_strategy(&self) -> ThumbnailStrategy {
        self.inner().thumbnail_strategy
    }

    pub fn assets_root(&self) -> &str {
        &self.inner().assets_root
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.inner().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.inner().max_thumbnail_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.inner().video_allowed_content_types
    }

    pub fn thumbnail_allowed_content_types(&self) -> &[String] {
        &self.inner().thumbnail_allowed_content_types
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().media_tool_timeout_secs)
    }

    pub fn probe_failure_policy(&self) -> ProbeFailurePolicy {
        self.inner().probe_failure_policy
    }

    pub fn upload_temp_dir(&self) -> Option<&str> {
        self.inner().upload_temp_dir.as_deref()
    }
}
