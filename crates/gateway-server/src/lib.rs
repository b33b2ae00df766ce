//! # Gateway Server
//!
//! HTTP server for the SEO platform gateway.
//!
//! This crate provides:
//! - The axum router: health probes, metrics, the `/api/*` reverse proxy,
//!   and the LLM generation endpoints
//! - Rate-limit and correlation middleware
//! - Error-to-response mapping
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
