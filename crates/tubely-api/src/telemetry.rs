//! Tracing subscriber setup
//!
//! Filter comes from `RUST_LOG`; output is human-readable unless `LOG_FORMAT=json`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Target matching is by prefix, so "tubely" covers every tubely_* crate.
const DEFAULT_FILTER: &str = "tubely=debug,tower_http=debug";

/// Install the global subscriber. Calling this more than once is harmless;
/// later calls keep the first subscriber.
pub fn init_telemetry(json: bool) -> Result<(), anyhow::Error> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json_layer, text_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }

    tracing::info!(json = json, "Telemetry initialized");
    Ok(())
}
