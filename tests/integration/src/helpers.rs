//! Test helper utilities for integration tests

use async_trait::async_trait;
use gateway_config::GatewayConfig;
use gateway_providers::LlmGateway;
use gateway_proxy::{
    CounterStore, Forwarder, MemoryCounterStore, RateLimiter, RouteTable, StoreError,
    TokenVerifier,
};
use gateway_routing::CostRouter;
use gateway_server::{create_router, AppState};
use gateway_telemetry::Metrics;
use once_cell::sync::Lazy;
use reqwest::{Client, Response};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// A counter store that always fails, for fail-open tests.
pub struct FailingCounterStore;

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn increment(&self, _key: &str, _window: Duration) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Builder for a gateway instance wired for tests.
pub struct TestGatewayBuilder {
    config: GatewayConfig,
    routes: Option<Vec<(String, String)>>,
    llm_gateway: Option<LlmGateway>,
    timeout: Duration,
    failing_store: bool,
}

impl Default for TestGatewayBuilder {
    fn default() -> Self {
        Self {
            config: GatewayConfig::default(),
            routes: None,
            llm_gateway: None,
            timeout: Duration::from_secs(2),
            failing_store: false,
        }
    }
}

impl TestGatewayBuilder {
    /// Register a proxy route (replaces the default table).
    pub fn with_route(mut self, prefix: &str, backend: &str) -> Self {
        self.routes
            .get_or_insert_with(Vec::new)
            .push((prefix.to_string(), backend.to_string()));
        self
    }

    /// Set the authenticated per-user rate limit (anonymous gets half).
    pub fn with_user_limit(mut self, limit: u64) -> Self {
        self.config.rate_limit_per_user_minute = limit;
        self
    }

    /// Set the proxy request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom LLM gateway (e.g. providers pointed at wiremock).
    pub fn with_llm_gateway(mut self, llm_gateway: LlmGateway) -> Self {
        self.llm_gateway = Some(llm_gateway);
        self
    }

    /// Use a rate-limit store that always errors (fail-open tests).
    pub fn with_failing_rate_limit_store(mut self) -> Self {
        self.failing_store = true;
        self
    }

    /// Build the state and start serving on an ephemeral port.
    pub async fn start(self) -> TestServer {
        init_tracing();

        let routes = self.routes.unwrap_or_else(|| self.config.service_routes());
        let forwarder =
            Forwarder::new(RouteTable::new(routes), self.timeout).expect("forwarder");

        let store: Arc<dyn CounterStore> = if self.failing_store {
            Arc::new(FailingCounterStore)
        } else {
            Arc::new(MemoryCounterStore::new())
        };
        let rate_limiter = RateLimiter::new(store);

        let token_verifier =
            TokenVerifier::new(&self.config.jwt_secret, &self.config.jwt_algorithm)
                .expect("verifier");

        let llm_gateway = self.llm_gateway.unwrap_or_else(|| {
            LlmGateway::with_standard_providers(None, None, None, None).expect("gateway")
        });
        let cost_router = CostRouter::with_available_providers(llm_gateway.available_providers());
        let metrics = Metrics::new().expect("metrics");

        let state = AppState::new(
            self.config,
            forwarder,
            rate_limiter,
            token_verifier,
            llm_gateway,
            cost_router,
            metrics,
        );

        TestServer::spawn(state).await
    }
}

/// Test server wrapper running the real gateway router.
pub struct TestServer {
    /// The server address
    pub addr: SocketAddr,
    /// HTTP client for making requests
    pub client: Client,
    /// Base URL for the server
    pub base_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a gateway with default test wiring.
    pub async fn with_defaults() -> Self {
        TestGatewayBuilder::default().start().await
    }

    /// Start a builder for custom wiring.
    pub fn builder() -> TestGatewayBuilder {
        TestGatewayBuilder::default()
    }

    async fn spawn(state: AppState) -> Self {
        let router = create_router(state);
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create client");

        Self {
            addr,
            client,
            base_url: format!("http://{addr}"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Make a GET request with headers
    pub async fn get_with_headers(&self, path: &str, headers: Vec<(&str, &str)>) -> Response {
        let mut builder = self.client.get(self.url(path));
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder.send().await.expect("Request failed")
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Parse response body as JSON
    pub async fn json_body(response: Response) -> Value {
        response.json().await.expect("Failed to parse JSON")
    }

    /// Shutdown the test server
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sign a JWT accepted by the default test configuration.
pub fn sign_test_token(sub: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        exp: u64,
    }

    encode(
        &Header::default(),
        &Claims {
            sub: sub.to_string(),
            exp: 4_102_444_800, // 2100-01-01
        },
        &EncodingKey::from_secret(b"your-jwt-secret-change-in-production"),
    )
    .expect("sign")
}

/// Assert a response has the given status code.
pub fn assert_status(response: &Response, expected: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected,
        "unexpected status for {}",
        response.url()
    );
}
