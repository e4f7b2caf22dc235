//! Tubely Core Library
//!
//! Shared building blocks for the tubely crates: configuration, the error
//! taxonomy surfaced to HTTP callers, and the domain models for videos and
//! their asset locators.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{BaseConfig, Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
