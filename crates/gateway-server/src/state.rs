//! Shared application state.

use gateway_config::GatewayConfig;
use gateway_core::GatewayError;
use gateway_providers::LlmGateway;
use gateway_proxy::{
    Forwarder, MemoryCounterStore, RateLimiter, RedisCounterStore, RouteTable, TokenVerifier,
};
use gateway_routing::CostRouter;
use gateway_telemetry::Metrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Process-scoped application state.
///
/// Every field is read-only after construction except the rate limiter's
/// backing store; cloning is cheap (all `Arc`s). Built once by the entry
/// point and injected into the router — there is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration.
    pub config: Arc<GatewayConfig>,
    /// Reverse-proxy forwarder with its route table.
    pub forwarder: Arc<Forwarder>,
    /// Fixed-window rate limiter.
    pub rate_limiter: Arc<RateLimiter>,
    /// JWT verifier for identity extraction.
    pub token_verifier: Arc<TokenVerifier>,
    /// LLM provider registry.
    pub llm_gateway: Arc<LlmGateway>,
    /// Cost-optimizing model selector.
    pub cost_router: Arc<CostRouter>,
    /// Prometheus metrics.
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Assemble state from pre-built components.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        forwarder: Forwarder,
        rate_limiter: RateLimiter,
        token_verifier: TokenVerifier,
        llm_gateway: LlmGateway,
        cost_router: CostRouter,
        metrics: Metrics,
    ) -> Self {
        Self {
            config: Arc::new(config),
            forwarder: Arc::new(forwarder),
            rate_limiter: Arc::new(rate_limiter),
            token_verifier: Arc::new(token_verifier),
            llm_gateway: Arc::new(llm_gateway),
            cost_router: Arc::new(cost_router),
            metrics: Arc::new(metrics),
        }
    }

    /// Build the full production state from configuration.
    ///
    /// Connects to Redis for rate limiting; when Redis is unreachable at
    /// startup the limiter degrades to an in-process store with a warning,
    /// keeping the gateway available (same fail-open stance as at request
    /// time).
    ///
    /// # Errors
    /// Returns an error when a component cannot be constructed (invalid
    /// JWT algorithm, HTTP client failure, metrics registration).
    pub async fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let routes = RouteTable::new(config.service_routes());
        let forwarder = Forwarder::new(routes, Duration::from_secs(config.request_timeout_secs))?;

        let rate_limiter = match RedisCounterStore::connect(&config.redis_url).await {
            Ok(store) => RateLimiter::new(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, using in-process rate-limit store");
                RateLimiter::new(Arc::new(MemoryCounterStore::new()))
            }
        };

        let token_verifier = TokenVerifier::new(&config.jwt_secret, &config.jwt_algorithm)?;

        let keys = &config.provider_keys;
        let llm_gateway = LlmGateway::with_standard_providers(
            keys.openai.clone(),
            keys.anthropic.clone(),
            keys.google.clone(),
            keys.xai.clone(),
        )?;
        let cost_router = CostRouter::with_available_providers(llm_gateway.available_providers());

        let metrics = Metrics::new()
            .map_err(|e| GatewayError::internal(format!("failed to register metrics: {e}")))?;

        Ok(Self::new(
            config,
            forwarder,
            rate_limiter,
            token_verifier,
            llm_gateway,
            cost_router,
            metrics,
        ))
    }
}
