//! Identity extraction for rate limiting.
//!
//! A bearer token that verifies against the configured HMAC secret yields
//! a user identity; anything else (missing header, malformed token, bad
//! signature, expired claims) silently degrades to the client IP. No 401
//! is ever raised at this layer.

use gateway_core::GatewayError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::str::FromStr;

/// Who a request is attributed to for rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Authenticated subject from a verified JWT.
    User(String),
    /// Anonymous caller keyed by IP address.
    Anonymous(String),
}

impl Identity {
    /// The rate-limit key for this identity on `path`.
    #[must_use]
    pub fn rate_limit_key(&self, path: &str) -> String {
        match self {
            Self::User(sub) => format!("ratelimit:user:{sub}:{path}"),
            Self::Anonymous(ip) => format!("ratelimit:ip:{ip}:{path}"),
        }
    }

    /// True for authenticated identities.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    #[serde(default)]
    workspace_id: Option<String>,
}

/// Verifies bearer tokens with a shared HMAC secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier for the given secret and algorithm name.
    ///
    /// # Errors
    /// Returns a configuration error for unsupported algorithm names.
    pub fn new(secret: &SecretString, algorithm: &str) -> Result<Self, GatewayError> {
        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            GatewayError::configuration(format!("unsupported JWT algorithm: {algorithm}"))
        })?;
        Ok(Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(algorithm),
        })
    }

    /// Extract the subject from an `Authorization` header value.
    ///
    /// Returns `None` on any decode failure — failures are swallowed by
    /// design so the caller degrades to anonymous identity.
    #[must_use]
    pub fn subject(&self, auth_header: &str) -> Option<String> {
        let token = auth_header.strip_prefix("Bearer ")?;
        decode::<Claims>(token, &self.key, &self.validation)
            .ok()
            .map(|data| data.claims.sub)
    }

    /// Resolve a request's identity from its auth header and client IP.
    #[must_use]
    pub fn identify(&self, auth_header: Option<&str>, client_ip: &str) -> Identity {
        auth_header
            .and_then(|header| self.subject(header))
            .map_or_else(
                || Identity::Anonymous(client_ip.to_string()),
                Identity::User,
            )
    }
}
