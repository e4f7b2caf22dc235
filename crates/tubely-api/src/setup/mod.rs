//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::auth::JwtVerifier;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegRepackager, FfprobeProber};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_json())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let videos: Arc<dyn VideoRepository> = match database::setup_database(&config).await? {
        Some(pool) => Arc::new(PgVideoRepository::new(pool)),
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let storage = storage::setup_storage(&config).await?;

    let prober = Arc::new(FfprobeProber::new(
        config.ffprobe_path().to_string(),
        config.media_tool_timeout(),
    ));
    let repackager = Arc::new(FfmpegRepackager::new(
        config.ffmpeg_path().to_string(),
        config.media_tool_timeout(),
    ));
    let identity = Arc::new(JwtVerifier::new(config.jwt_secret(), config.jwt_issuer()));

    let state = services::build_state(config, videos, storage, prober, repackager, identity);
    let router = routes::build_router(state.clone());

    Ok((state, router))
}
