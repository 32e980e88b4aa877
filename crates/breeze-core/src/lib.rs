//! Shared foundation for Breezeboard: configuration and error types.

pub mod config;
pub mod error;

pub use config::{Config, ServerConfig, ValidationResult, WeatherSettings};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize logging for the application.
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Breezeboard core initialized");
    Ok(())
}
