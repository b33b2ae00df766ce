//! HTTP request handlers for the gateway.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_core::GenerationRequest;
use gateway_routing::Priority;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CorrelationId;
use crate::state::AppState;

/// Liveness probe endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "api-gateway" }))
}

/// Readiness probe endpoint.
pub async fn readiness_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready", "service": "api-gateway" }))
}

/// Metrics endpoint (Prometheus text format).
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.gather(),
    )
}

/// Proxy all `/api/*` requests to the backend resolved from the route table.
pub async fn proxy_api(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(String::from);
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map_or_else(|| Uuid::new_v4().to_string(), |c| c.0.clone());
    let headers = request.headers().clone();

    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read request body: {e}")))?;

    let proxied = state
        .forwarder
        .forward(
            method,
            &path,
            query.as_deref(),
            headers,
            body,
            &correlation_id,
        )
        .await?;

    let mut response = Response::builder().status(proxied.status);
    if let Some(response_headers) = response.headers_mut() {
        *response_headers = sanitize_backend_headers(proxied.headers);
    }
    response
        .body(axum::body::Body::from(proxied.body))
        .map_err(|e| ApiError::internal(format!("failed to build response: {e}")))
}

/// Drop headers that only make sense on the backend hop; the body has been
/// fully buffered, so framing headers no longer apply.
fn sanitize_backend_headers(mut headers: HeaderMap) -> HeaderMap {
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    headers
}

/// Request body for `POST /llm/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateApiRequest {
    /// The user prompt.
    pub prompt: String,
    /// Provider name (default: openai).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Optional specific model.
    #[serde(default)]
    pub model: Option<String>,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2_000
}

/// Response body for `POST /llm/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateApiResponse {
    /// Generated content.
    pub content: String,
    /// Model that produced the content.
    pub model: String,
    /// Provider that served the request.
    pub provider: String,
    /// Prompt tokens consumed.
    pub input_tokens: u32,
    /// Completion tokens produced.
    pub output_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
    /// Cost in USD as a decimal string.
    pub cost_usd: String,
}

/// Generate content through the LLM gateway.
#[instrument(skip(state, body), fields(provider = %body.provider))]
pub async fn generate_content(
    State(state): State<AppState>,
    Json(body): Json<GenerateApiRequest>,
) -> Result<Json<GenerateApiResponse>, ApiError> {
    let mut builder = GenerationRequest::builder(body.prompt)
        .temperature(body.temperature)
        .max_tokens(body.max_tokens);
    if let Some(model) = body.model {
        builder = builder.model(model);
    }
    if let Some(system_prompt) = body.system_prompt {
        builder = builder.system_prompt(system_prompt);
    }
    let request = builder.build()?;

    let response = state.llm_gateway.generate(&body.provider, &request).await?;

    state.metrics.record_llm_tokens(
        &response.provider,
        &response.model,
        u64::from(response.total_tokens),
    );

    Ok(Json(GenerateApiResponse {
        content: response.content,
        model: response.model,
        provider: response.provider,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        total_tokens: response.total_tokens,
        cost_usd: response.cost_usd.to_string(),
    }))
}

/// Request body for `POST /llm/select-model`.
#[derive(Debug, Deserialize)]
pub struct ModelSelectionApiRequest {
    /// Priority level (default: medium).
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Target word count.
    #[serde(default)]
    pub word_count: Option<u64>,
    /// Maximum budget in USD.
    #[serde(default)]
    pub max_budget_usd: Option<Decimal>,
}

fn default_priority() -> String {
    "medium".to_string()
}

/// Response body for `POST /llm/select-model`.
#[derive(Debug, Serialize)]
pub struct ModelSelectionApiResponse {
    /// Selected provider.
    pub provider: String,
    /// Selected model.
    pub model: String,
    /// Estimated cost per 1K output tokens.
    pub estimated_cost_per_1k_tokens: Decimal,
    /// Which constraint drove the choice.
    pub reason: String,
}

/// Select the optimal model for the given constraints.
#[instrument(skip(state))]
pub async fn select_model(
    State(state): State<AppState>,
    Json(body): Json<ModelSelectionApiRequest>,
) -> Json<ModelSelectionApiResponse> {
    let priority = Priority::parse_or_default(&body.priority);
    let selection = state
        .cost_router
        .select(priority, body.word_count, body.max_budget_usd);

    debug!(
        provider = %selection.provider,
        model = %selection.model,
        reason = %selection.reason,
        "Model selected"
    );

    Json(ModelSelectionApiResponse {
        provider: selection.provider,
        model: selection.model,
        estimated_cost_per_1k_tokens: selection.estimated_cost_per_1k_tokens,
        reason: selection.reason,
    })
}

/// One provider's info in the `GET /llm/providers` listing.
#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    /// Provider name.
    pub name: String,
    /// Whether credentials are configured.
    pub available: bool,
    /// Models the provider serves.
    pub models: Vec<String>,
    /// Default model.
    pub default_model: String,
}

/// List all registered LLM providers and their models.
pub async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let providers = state
        .llm_gateway
        .all_providers()
        .into_iter()
        .filter_map(|name| {
            state.llm_gateway.get(&name).map(|provider| ProviderInfo {
                name,
                available: provider.is_available(),
                models: provider.available_models(),
                default_model: provider.default_model().to_string(),
            })
        })
        .collect();

    Json(providers)
}
