//! Generation request and response types.
//!
//! This module defines the uniform contract shared by every LLM provider:
//! callers build a [`GenerationRequest`], providers answer with a
//! [`GenerationResponse`] carrying token accounting and a decimal cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Maximum accepted prompt length in characters.
pub const MAX_PROMPT_CHARS: usize = 50_000;

/// Maximum tokens a single generation may request.
pub const MAX_OUTPUT_TOKENS: u32 = 8_000;

/// A provider-agnostic content generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user prompt to generate content from.
    pub prompt: String,

    /// Specific model to use; `None` selects the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Optional system prompt for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Sampling temperature (0.0 - 1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2_000
}

impl GenerationRequest {
    /// Create a request with default sampling parameters.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Create a new builder for `GenerationRequest`.
    #[must_use]
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            request: Self::new(prompt),
        }
    }

    /// Validate the request fields.
    ///
    /// # Errors
    /// Returns a validation error if any field is out of range.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.prompt.is_empty() {
            return Err(GatewayError::validation("prompt cannot be empty"));
        }
        if self.prompt.len() > MAX_PROMPT_CHARS {
            return Err(GatewayError::validation(format!(
                "prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(GatewayError::validation(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_OUTPUT_TOKENS {
            return Err(GatewayError::validation(format!(
                "max_tokens must be between 1 and {MAX_OUTPUT_TOKENS}, got {}",
                self.max_tokens
            )));
        }
        Ok(())
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug)]
pub struct GenerationRequestBuilder {
    request: GenerationRequest,
}

impl GenerationRequestBuilder {
    /// Set the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.request.model = Some(model.into());
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.request.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = temperature;
        self
    }

    /// Set the maximum output tokens.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    /// Build and validate the request.
    ///
    /// # Errors
    /// Returns a validation error if any field is out of range.
    pub fn build(self) -> Result<GenerationRequest, GatewayError> {
        self.request.validate()?;
        Ok(self.request)
    }
}

/// A normalized response from any LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
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
    /// `input_tokens + output_tokens`.
    pub total_tokens: u32,
    /// Cost in USD, computed in decimal arithmetic.
    pub cost_usd: Decimal,
    /// Free-form provider metadata (finish reason, mock marker, ...).
    pub metadata: Map<String, Value>,
}

impl GenerationResponse {
    /// True when this response was synthesized without a live API call.
    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.metadata
            .get("mock")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
