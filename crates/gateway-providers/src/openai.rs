//! OpenAI provider implementation.
//!
//! Talks to the chat completions API. The wire types here are shared with
//! the xAI provider, which exposes the same request/response shape.

use async_trait::async_trait;
use gateway_core::{GatewayError, GenerationRequest, GenerationResponse, LlmProvider, ModelPricing};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::mock::mock_response;

/// Pricing per 1K tokens.
pub const OPENAI_PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "gpt-4o",
        input_per_1k: dec!(0.0025),
        output_per_1k: dec!(0.01),
    },
    ModelPricing {
        model: "gpt-4o-mini",
        input_per_1k: dec!(0.00015),
        output_per_1k: dec!(0.0006),
    },
    ModelPricing {
        model: "gpt-4-turbo",
        input_per_1k: dec!(0.01),
        output_per_1k: dec!(0.03),
    },
    ModelPricing {
        model: "gpt-4",
        input_per_1k: dec!(0.03),
        output_per_1k: dec!(0.06),
    },
    ModelPricing {
        model: "gpt-3.5-turbo",
        input_per_1k: dec!(0.0015),
        output_per_1k: dec!(0.002),
    },
];

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key; `None` puts the provider in mock mode.
    pub api_key: Option<SecretString>,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a configuration with the production base URL.
    #[must_use]
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI API provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn pricing_for(model: &str) -> &'static ModelPricing {
        pricing_lookup(OPENAI_PRICING, model, DEFAULT_MODEL)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn available_models(&self) -> Vec<String> {
        OPENAI_PRICING.iter().map(|p| p.model.to_string()).collect()
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> Decimal {
        Self::pricing_for(model).cost(input_tokens, output_tokens)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let Some(api_key) = &self.config.api_key else {
            warn!(provider = "openai", "API key not configured, returning mock response");
            return Ok(mock_response("openai", model, &request.prompt, |i, o| {
                self.calculate_cost(i, o, model)
            }));
        };

        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(provider = "openai", model = %model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::provider("openai", format!("request failed: {e}"), None))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::provider("openai", format!("failed to read response: {e}"), None)
        })?;

        if !status.is_success() {
            return Err(parse_chat_error("openai", status.as_u16(), &text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::provider("openai", format!("invalid response JSON: {e}"), None)
        })?;

        build_chat_response("openai", model, parsed, |i, o| {
            self.calculate_cost(i, o, model)
        })
    }
}

/// Look up a model's pricing, falling back to the default model.
pub(crate) fn pricing_lookup<'a>(
    table: &'a [ModelPricing],
    model: &str,
    default_model: &str,
) -> &'a ModelPricing {
    table
        .iter()
        .find(|p| p.model == model)
        .or_else(|| table.iter().find(|p| p.model == default_model))
        .unwrap_or(&table[0])
}

/// Convert a chat-completions payload into the gateway response shape.
pub(crate) fn build_chat_response<F>(
    provider: &str,
    model: &str,
    parsed: ChatCompletionResponse,
    calculate_cost: F,
) -> Result<GenerationResponse, GatewayError>
where
    F: FnOnce(u32, u32) -> Decimal,
{
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::provider(provider, "no choices in response", None))?;

    let usage = parsed.usage.unwrap_or_default();
    let cost_usd = calculate_cost(usage.prompt_tokens, usage.completion_tokens);

    let mut metadata = Map::new();
    if let Some(reason) = choice.finish_reason {
        metadata.insert("finish_reason".to_string(), Value::String(reason));
    }

    Ok(GenerationResponse {
        content: choice.message.content.unwrap_or_default(),
        model: model.to_string(),
        provider: provider.to_string(),
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        total_tokens: usage.prompt_tokens + usage.completion_tokens,
        cost_usd,
        metadata,
    })
}

/// Parse a chat-completions error body into a provider error.
pub(crate) fn parse_chat_error(provider: &str, status: u16, body: &str) -> GatewayError {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorResponse>(body).map_or_else(
        |_| GatewayError::provider(provider, format!("HTTP {status}: {body}"), Some(status)),
        |e| GatewayError::provider(provider, e.error.message, Some(status)),
    )
}

// Chat completions wire types (shared with the xAI provider)

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<WireChoice>,
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: WireResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}
