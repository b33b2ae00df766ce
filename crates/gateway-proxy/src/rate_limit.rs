//! Fixed-window rate limiting over a pluggable counter store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

/// The fixed rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Paths that never consume a rate-limit slot.
pub const BYPASS_PATHS: &[&str] = &["/health", "/ready", "/metrics"];

/// True when a path is exempt from rate limiting.
#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PATHS.contains(&path)
}

/// Errors from the counter store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Redis-level failure (connection, protocol, script).
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The store cannot be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Atomic increment-with-expiry primitive backing the rate limiter.
///
/// Implementations MUST perform the increment and the window-creation
/// expiry as one atomic operation, and MUST NOT refresh the expiry on
/// subsequent increments — otherwise the fixed window silently becomes a
/// sliding one.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key`, creating it with `window` expiry when absent.
    /// Returns the post-increment count.
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError>;
}

/// Redis-backed counter store.
///
/// INCR and conditional EXPIRE run inside a single Lua script so the TTL
/// is set exactly once per window, and concurrent increments of the same
/// key serialize on the server.
pub struct RedisCounterStore {
    conn: redis::aio::ConnectionManager,
    script: redis::Script,
}

const INCR_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
";

impl RedisCounterStore {
    /// Connect to Redis at `url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            script: redis::Script::new(INCR_SCRIPT),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let count: u64 = self
            .script
            .key(key)
            .arg(window.as_secs())
            .invoke_async(&mut conn)
            .await?;
        Ok(count)
    }
}

/// In-process counter store for tests and single-node development.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: DashMap<String, WindowEntry>,
}

struct WindowEntry {
    count: u64,
    expires_at: Instant,
}

impl MemoryCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            expires_at: now + window,
        });
        // expires_at is stamped on creation only; an expired entry starts
        // a fresh window instead of sliding the old one.
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count += 1;
        Ok(entry.count)
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request must be rejected.
    pub is_limited: bool,
    /// Remaining requests in the current window.
    pub remaining: u64,
}

/// Fixed-window rate limiter.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Create a limiter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Check (and consume) one slot for `key`.
    ///
    /// Fails OPEN: when the store is unreachable the request is admitted
    /// with the full limit reported as remaining, and a warning is logged.
    /// A rate-limiter outage must not become a platform outage.
    pub async fn check(&self, key: &str, limit: u64, window: Duration) -> RateLimitDecision {
        match self.store.increment(key, window).await {
            Ok(count) => RateLimitDecision {
                is_limited: count > limit,
                remaining: limit.saturating_sub(count),
            },
            Err(e) => {
                warn!(key = key, error = %e, "Rate limiting error, failing open");
                RateLimitDecision {
                    is_limited: false,
                    remaining: limit,
                }
            }
        }
    }
}
