//! xAI (Grok) provider implementation.
//!
//! xAI exposes an OpenAI-compatible chat completions API, so this provider
//! reuses the OpenAI wire types against `https://api.x.ai/v1`.

use async_trait::async_trait;
use gateway_core::{GatewayError, GenerationRequest, GenerationResponse, LlmProvider, ModelPricing};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

use crate::mock::mock_response;
use crate::openai::{
    build_chat_response, parse_chat_error, pricing_lookup, ChatCompletionRequest,
    ChatCompletionResponse, WireMessage,
};

/// Pricing per 1K tokens.
pub const XAI_PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "grok-beta",
        input_per_1k: dec!(0.005),
        output_per_1k: dec!(0.015),
    },
    ModelPricing {
        model: "grok-2",
        input_per_1k: dec!(0.002),
        output_per_1k: dec!(0.01),
    },
];

const DEFAULT_MODEL: &str = "grok-beta";
const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// xAI provider configuration.
#[derive(Debug, Clone)]
pub struct XaiConfig {
    /// API key; `None` puts the provider in mock mode.
    pub api_key: Option<SecretString>,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl XaiConfig {
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

/// xAI (Grok) API provider.
pub struct XaiProvider {
    config: XaiConfig,
    client: Client,
}

impl XaiProvider {
    /// Create a new xAI provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: XaiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmProvider for XaiProvider {
    fn name(&self) -> &str {
        "xai"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn available_models(&self) -> Vec<String> {
        XAI_PRICING.iter().map(|p| p.model.to_string()).collect()
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> Decimal {
        pricing_lookup(XAI_PRICING, model, DEFAULT_MODEL).cost(input_tokens, output_tokens)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let Some(api_key) = &self.config.api_key else {
            warn!(provider = "xai", "API key not configured, returning mock response");
            return Ok(mock_response("xai", model, &request.prompt, |i, o| {
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
        debug!(provider = "xai", model = %model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::provider("xai", format!("request failed: {e}"), None))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::provider("xai", format!("failed to read response: {e}"), None)
        })?;

        if !status.is_success() {
            return Err(parse_chat_error("xai", status.as_u16(), &text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::provider("xai", format!("invalid response JSON: {e}"), None)
        })?;

        build_chat_response("xai", model, parsed, |i, o| self.calculate_cost(i, o, model))
    }
}
