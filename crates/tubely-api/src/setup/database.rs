//! Postgres pool for the video metadata store

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use tubely_core::Config;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const POOL_MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Connect and run migrations; `None` when no database is configured
pub async fn setup_database(config: &Config) -> Result<Option<PgPool>> {
    let Some(database_url) = config.database_url() else {
        return Ok(None);
    };

    tracing::info!("Connecting to metadata database");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(POOL_IDLE_TIMEOUT)
        .max_lifetime(POOL_MAX_LIFETIME)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Metadata database connected"
    );

    // Workspace migrations/ relative to this crate
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Video schema migrations applied");

    Ok(Some(pool))
}
