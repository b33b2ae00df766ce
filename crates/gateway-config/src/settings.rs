//! Gateway settings loaded from environment variables.

use secrecy::SecretString;
use std::env;
use thiserror::Error;
use url::Url;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that failed to parse.
    #[error("invalid value for {var}: {message}")]
    InvalidValue {
        /// Offending environment variable.
        var: String,
        /// Parse failure detail.
        message: String,
    },
}

/// Per-provider API credentials.
///
/// A `None` key means the provider runs in mock mode.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    /// OpenAI API key.
    pub openai: Option<SecretString>,
    /// Anthropic API key.
    pub anthropic: Option<SecretString>,
    /// Google AI Studio API key.
    pub google: Option<SecretString>,
    /// xAI API key.
    pub xai: Option<SecretString>,
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deployment environment (development, staging, production).
    pub environment: String,
    /// Log level passed to the tracing filter.
    pub log_level: String,
    /// Emit JSON logs instead of human-readable ones.
    pub log_json: bool,

    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,

    /// Redis connection URL for the rate-limit store.
    pub redis_url: String,

    /// HMAC secret used to verify inbound JWTs.
    pub jwt_secret: SecretString,
    /// JWT signing algorithm name (HS256, HS384, HS512).
    pub jwt_algorithm: String,

    /// Auth service base URL.
    pub auth_service_url: String,
    /// Notification service base URL.
    pub notification_service_url: String,
    /// Keyword ingestion service base URL.
    pub keyword_ingestion_url: String,
    /// SEO strategy service base URL.
    pub seo_strategy_url: String,
    /// SEO scorer service base URL.
    pub seo_scorer_url: String,
    /// Content generator service base URL.
    pub content_generator_url: String,
    /// Analytics service base URL.
    pub analytics_url: String,

    /// Authenticated per-user requests per minute.
    pub rate_limit_per_user_minute: u64,
    /// Per-workspace requests per minute.
    pub rate_limit_per_workspace_minute: u64,

    /// Proxy request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,

    /// LLM provider credentials.
    pub provider_keys: ProviderKeys,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
            redis_url: "redis://localhost:6379/0".to_string(),
            jwt_secret: SecretString::new("your-jwt-secret-change-in-production".to_string()),
            jwt_algorithm: "HS256".to_string(),
            auth_service_url: "http://localhost:8081".to_string(),
            notification_service_url: "http://localhost:8082".to_string(),
            keyword_ingestion_url: "http://localhost:8083".to_string(),
            seo_strategy_url: "http://localhost:8084".to_string(),
            seo_scorer_url: "http://localhost:8085".to_string(),
            content_generator_url: "http://localhost:8086".to_string(),
            analytics_url: "http://localhost:8087".to_string(),
            rate_limit_per_user_minute: 100,
            rate_limit_per_workspace_minute: 1_000,
            request_timeout_secs: 30,
            cors_origins: vec!["http://localhost:3000".to_string()],
            provider_keys: ProviderKeys::default(),
        }
    }
}

impl GatewayConfig {
    /// Load the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error when a variable is present but unparseable, or when
    /// a service URL is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            environment: env_or("APP_ENV", defaults.environment),
            log_level: env_or("LOG_LEVEL", defaults.log_level),
            log_json: parse_env("LOG_JSON", defaults.log_json)?,
            host: env_or("HOST", defaults.host),
            port: parse_env("PORT", defaults.port)?,
            redis_url: env_or("REDIS_URL", defaults.redis_url),
            jwt_secret: env::var("JWT_SECRET_KEY")
                .map_or(defaults.jwt_secret, SecretString::new),
            jwt_algorithm: env_or("JWT_ALGORITHM", defaults.jwt_algorithm),
            auth_service_url: env_or("AUTH_SERVICE_URL", defaults.auth_service_url),
            notification_service_url: env_or(
                "NOTIFICATION_SERVICE_URL",
                defaults.notification_service_url,
            ),
            keyword_ingestion_url: env_or("KEYWORD_INGESTION_URL", defaults.keyword_ingestion_url),
            seo_strategy_url: env_or("SEO_STRATEGY_URL", defaults.seo_strategy_url),
            seo_scorer_url: env_or("SEO_SCORER_URL", defaults.seo_scorer_url),
            content_generator_url: env_or("CONTENT_GENERATOR_URL", defaults.content_generator_url),
            analytics_url: env_or("ANALYTICS_URL", defaults.analytics_url),
            rate_limit_per_user_minute: parse_env(
                "RATE_LIMIT_PER_USER_MINUTE",
                defaults.rate_limit_per_user_minute,
            )?,
            rate_limit_per_workspace_minute: parse_env(
                "RATE_LIMIT_PER_WORKSPACE_MINUTE",
                defaults.rate_limit_per_workspace_minute,
            )?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", defaults.request_timeout_secs)?,
            cors_origins: env::var("CORS_ORIGINS").map_or(defaults.cors_origins, |raw| {
                raw.split(',').map(|s| s.trim().to_string()).collect()
            }),
            provider_keys: ProviderKeys {
                openai: secret_env("OPENAI_API_KEY"),
                anthropic: secret_env("ANTHROPIC_API_KEY"),
                google: secret_env("GOOGLE_API_KEY"),
                xai: secret_env("XAI_API_KEY"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// The proxy route table in registration order.
    ///
    /// Order matters: resolution is first-match-wins, so more specific
    /// prefixes must be registered before broader ones.
    #[must_use]
    pub fn service_routes(&self) -> Vec<(String, String)> {
        vec![
            ("/api/v1/auth".to_string(), self.auth_service_url.clone()),
            ("/api/v1/workspaces".to_string(), self.auth_service_url.clone()),
            ("/api/v1/sites".to_string(), self.auth_service_url.clone()),
            ("/api/v1/api-keys".to_string(), self.auth_service_url.clone()),
            (
                "/api/v1/notifications".to_string(),
                self.notification_service_url.clone(),
            ),
            (
                "/api/v1/keywords".to_string(),
                self.keyword_ingestion_url.clone(),
            ),
            (
                "/api/v1/strategies".to_string(),
                self.seo_strategy_url.clone(),
            ),
            ("/api/v1/scores".to_string(), self.seo_scorer_url.clone()),
            (
                "/api/v1/articles".to_string(),
                self.content_generator_url.clone(),
            ),
            ("/api/v1/analytics".to_string(), self.analytics_url.clone()),
        ]
    }

    /// The rate limit applied to anonymous (IP-keyed) traffic.
    #[must_use]
    pub fn anonymous_rate_limit(&self) -> u64 {
        self.rate_limit_per_user_minute / 2
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (prefix, url) in self.service_routes() {
            Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
                var: format!("service URL for {prefix}"),
                message: e.to_string(),
            })?;
        }
        match self.jwt_algorithm.as_str() {
            "HS256" | "HS384" | "HS512" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                var: "JWT_ALGORITHM".to_string(),
                message: format!("unsupported algorithm: {other}"),
            }),
        }
    }
}

fn env_or(var: &str, default: String) -> String {
    env::var(var).unwrap_or(default)
}

fn secret_env(var: &str) -> Option<SecretString> {
    env::var(var).ok().filter(|v| !v.is_empty()).map(SecretString::new)
}

fn parse_env<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
