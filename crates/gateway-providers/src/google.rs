//! Google Generative AI (Gemini) provider implementation.
//!
//! Uses the Google AI Studio `generateContent` endpoint:
//! `https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:generateContent`

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
use crate::openai::pricing_lookup;

/// Pricing per 1K tokens.
pub const GOOGLE_PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "gemini-1.5-pro",
        input_per_1k: dec!(0.00125),
        output_per_1k: dec!(0.005),
    },
    ModelPricing {
        model: "gemini-1.5-flash",
        input_per_1k: dec!(0.000075),
        output_per_1k: dec!(0.0003),
    },
    ModelPricing {
        model: "gemini-pro",
        input_per_1k: dec!(0.0005),
        output_per_1k: dec!(0.0015),
    },
];

const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google provider configuration.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// API key; `None` puts the provider in mock mode.
    pub api_key: Option<SecretString>,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GoogleConfig {
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

/// Google Gemini provider.
pub struct GoogleProvider {
    config: GoogleConfig,
    client: Client,
}

impl GoogleProvider {
    /// Create a new Google provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GoogleConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn endpoint_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, api_key
        )
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn available_models(&self) -> Vec<String> {
        GOOGLE_PRICING.iter().map(|p| p.model.to_string()).collect()
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> Decimal {
        pricing_lookup(GOOGLE_PRICING, model, DEFAULT_MODEL).cost(input_tokens, output_tokens)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let Some(api_key) = &self.config.api_key else {
            warn!(provider = "google", "API key not configured, returning mock response");
            return Ok(mock_response("google", model, &request.prompt, |i, o| {
                self.calculate_cost(i, o, model)
            }));
        };

        let body = GenerateContentRequest {
            contents: vec![GoogleContent {
                role: Some("user".to_string()),
                parts: vec![GooglePart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|system| GoogleContent {
                role: None,
                parts: vec![GooglePart {
                    text: system.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let url = self.endpoint_url(model, api_key.expose_secret());
        debug!(provider = "google", model = %model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::provider("google", format!("request failed: {e}"), None))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            GatewayError::provider("google", format!("failed to read response: {e}"), None)
        })?;

        if !status.is_success() {
            return Err(parse_google_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::provider("google", format!("invalid response JSON: {e}"), None)
        })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::provider("google", "no candidates in response", None))?;

        let content = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        let usage = parsed.usage_metadata.unwrap_or_default();
        let cost_usd =
            self.calculate_cost(usage.prompt_token_count, usage.candidates_token_count, model);

        let mut metadata = Map::new();
        if let Some(reason) = candidate.finish_reason {
            metadata.insert("finish_reason".to_string(), Value::String(reason));
        }

        Ok(GenerationResponse {
            content,
            model: model.to_string(),
            provider: "google".to_string(),
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.prompt_token_count + usage.candidates_token_count,
            cost_usd,
            metadata,
        })
    }
}

fn parse_google_error(status: u16, body: &str) -> GatewayError {
    #[derive(Deserialize)]
    struct GoogleErrorResponse {
        error: GoogleErrorDetail,
    }

    #[derive(Deserialize)]
    struct GoogleErrorDetail {
        message: String,
    }

    serde_json::from_str::<GoogleErrorResponse>(body).map_or_else(
        |_| GatewayError::provider("google", format!("HTTP {status}: {body}"), Some(status)),
        |e| GatewayError::provider("google", e.error.message, Some(status)),
    )
}

// Google API wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<GoogleUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    content: GoogleContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}
