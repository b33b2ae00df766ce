//! Anthropic Claude provider implementation.

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
use crate::openai::{parse_chat_error, pricing_lookup};

/// Pricing per 1K tokens.
pub const ANTHROPIC_PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "claude-3-5-sonnet-20241022",
        input_per_1k: dec!(0.003),
        output_per_1k: dec!(0.015),
    },
    ModelPricing {
        model: "claude-3-sonnet-20240229",
        input_per_1k: dec!(0.003),
        output_per_1k: dec!(0.015),
    },
    ModelPricing {
        model: "claude-3-opus-20240229",
        input_per_1k: dec!(0.015),
        output_per_1k: dec!(0.075),
    },
    ModelPricing {
        model: "claude-3-haiku-20240307",
        input_per_1k: dec!(0.00025),
        output_per_1k: dec!(0.00125),
    },
];

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key; `None` puts the provider in mock mode.
    pub api_key: Option<SecretString>,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
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

/// Anthropic Claude API provider.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AnthropicConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn available_models(&self) -> Vec<String> {
        ANTHROPIC_PRICING
            .iter()
            .map(|p| p.model.to_string())
            .collect()
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> Decimal {
        pricing_lookup(ANTHROPIC_PRICING, model, DEFAULT_MODEL).cost(input_tokens, output_tokens)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let Some(api_key) = &self.config.api_key else {
            warn!(provider = "anthropic", "API key not configured, returning mock response");
            return Ok(mock_response("anthropic", model, &request.prompt, |i, o| {
                self.calculate_cost(i, o, model)
            }));
        };

        let body = MessagesRequest {
            model: model.to_string(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt.clone(),
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let url = format!("{}/messages", self.config.base_url);
        debug!(provider = "anthropic", model = %model, "Sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                GatewayError::provider("anthropic", format!("request failed: {e}"), None)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::provider("anthropic", format!("failed to read response: {e}"), None)
        })?;

        if !status.is_success() {
            return Err(parse_chat_error("anthropic", status.as_u16(), &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::provider("anthropic", format!("invalid response JSON: {e}"), None)
        })?;

        let content = parsed
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        let cost_usd =
            self.calculate_cost(parsed.usage.input_tokens, parsed.usage.output_tokens, model);

        let mut metadata = Map::new();
        if let Some(reason) = parsed.stop_reason {
            metadata.insert("stop_reason".to_string(), Value::String(reason));
        }

        Ok(GenerationResponse {
            content,
            model: model.to_string(),
            provider: "anthropic".to_string(),
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            total_tokens: parsed.usage.input_tokens + parsed.usage.output_tokens,
            cost_usd,
            metadata,
        })
    }
}

// Messages API wire types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: MessagesUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}
