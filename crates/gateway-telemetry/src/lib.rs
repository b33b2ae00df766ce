//! # Gateway Telemetry
//!
//! Observability for the SEO platform gateway:
//! - Prometheus metrics (request counts, latencies, rate-limit rejections,
//!   LLM token usage)
//! - Structured logging via `tracing`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;
pub mod tracing_setup;

// Re-export main types
pub use metrics::Metrics;
pub use tracing_setup::{init_tracing, TracingConfig};
