//! Error types for the gateway.
//!
//! Every failure mode the gateway can synthesize into an HTTP response has
//! its own variant; provider-level failures carry the provider name so the
//! API boundary can log the upstream message without exposing it.

use thiserror::Error;

/// Result alias using [`GatewayError`].
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors produced by the gateway core.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No registered route prefix matched the request path.
    #[error("no route registered for path: {path}")]
    RouteNotFound {
        /// The request path that failed to resolve.
        path: String,
    },

    /// The proxied backend did not answer within the request timeout.
    #[error("backend request timed out: {url}")]
    BackendTimeout {
        /// Target URL of the abandoned request.
        url: String,
    },

    /// The proxied backend could not be reached at all.
    #[error("backend unreachable: {url}: {message}")]
    BackendUnreachable {
        /// Target URL of the failed request.
        url: String,
        /// Connection-level error detail.
        message: String,
    },

    /// A rate-limit window has been exhausted for the caller.
    #[error("rate limit exceeded for key: {key}")]
    RateLimited {
        /// The rate-limit key that was exhausted.
        key: String,
    },

    /// The requested provider name is not in the registry.
    #[error("provider '{name}' not found; available: {available:?}")]
    InvalidProvider {
        /// The unknown provider name.
        name: String,
        /// Names of all registered providers.
        available: Vec<String>,
    },

    /// A provider API call failed.
    #[error("provider '{provider}' error: {message}")]
    Provider {
        /// Provider that produced the failure.
        provider: String,
        /// Upstream error message.
        message: String,
        /// HTTP status returned by the provider, when known.
        status: Option<u16>,
    },

    /// A request failed validation before any work was done.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description of the invalid field.
        message: String,
    },

    /// Invalid or incomplete configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// What was wrong with the configuration.
        message: String,
    },

    /// Catch-all for internal failures that have no dedicated variant.
    #[error("internal error: {message}")]
    Internal {
        /// Error detail.
        message: String,
    },
}

impl GatewayError {
    /// Create a provider error.
    pub fn provider(
        provider: impl Into<String>,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
