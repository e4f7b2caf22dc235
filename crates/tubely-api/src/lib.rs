//! Tubely HTTP API
//!
//! Video and thumbnail upload endpoints plus the pipeline that probes,
//! repackages and stores uploaded media.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
