//! # Gateway Proxy
//!
//! The reverse-proxy half of the SEO platform gateway:
//! - [`RouteTable`]: first-match-wins prefix routing to backend services
//! - [`Forwarder`]: header-preserving request forwarding with timeout
//!   and connection-failure synthesis
//! - [`RateLimiter`]: fixed-window counters over a pluggable atomic store,
//!   failing open when the store is unreachable
//! - [`TokenVerifier`]: JWT-aware identity extraction with IP fallback

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod forwarder;
pub mod identity;
pub mod rate_limit;
pub mod routes;

// Re-export main types
pub use forwarder::{Forwarder, ProxiedResponse};
pub use identity::{Identity, TokenVerifier};
pub use rate_limit::{
    is_bypassed, CounterStore, MemoryCounterStore, RateLimitDecision, RateLimiter,
    RedisCounterStore, StoreError, BYPASS_PATHS, RATE_LIMIT_WINDOW,
};
pub use routes::RouteTable;
