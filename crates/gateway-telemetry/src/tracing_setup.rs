//! Structured logging setup.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON logs instead of human-readable ones.
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Errors raised during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed.
    #[error("failed to initialize tracing: {0}")]
    Init(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level, matching the
/// usual operator expectation.
///
/// # Errors
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry();
    if config.json {
        registry
            .with(fmt::layer().json().with_filter(filter))
            .try_init()
            .map_err(|e| TracingError::Init(e.to_string()))?;
    } else {
        registry
            .with(fmt::layer().with_filter(filter))
            .try_init()
            .map_err(|e| TracingError::Init(e.to_string()))?;
    }

    Ok(())
}
