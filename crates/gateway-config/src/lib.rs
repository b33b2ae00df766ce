//! # Gateway Config
//!
//! Environment-driven configuration for the SEO platform gateway.
//!
//! Every setting has a development default so the gateway starts with an
//! empty environment; production deployments override via env vars.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod settings;

pub use settings::{ConfigError, GatewayConfig, ProviderKeys};
