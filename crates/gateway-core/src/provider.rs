//! Provider trait and pricing types.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::GatewayError;
use crate::generation::{GenerationRequest, GenerationResponse};

/// Price of one model, in USD per 1K tokens.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    /// Model identifier the price applies to.
    pub model: &'static str,
    /// USD per 1K input tokens.
    pub input_per_1k: Decimal,
    /// USD per 1K output tokens.
    pub output_per_1k: Decimal,
}

impl ModelPricing {
    /// Compute the cost of a token usage pair against this price entry.
    ///
    /// The arithmetic is pure decimal: repeated aggregation of the result
    /// never drifts the way binary floating point would.
    #[must_use]
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> Decimal {
        let thousand = Decimal::from(1_000);
        Decimal::from(input_tokens) / thousand * self.input_per_1k
            + Decimal::from(output_tokens) / thousand * self.output_per_1k
    }
}

/// Uniform capability contract implemented by every LLM provider.
///
/// Callers never branch on the concrete provider type; the registry hands
/// out `Arc<dyn LlmProvider>` and everything downstream goes through this
/// trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable provider name used as the registry key (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Whether valid credentials are configured.
    ///
    /// An unavailable provider still answers [`generate`](Self::generate)
    /// calls with a deterministic mock response.
    fn is_available(&self) -> bool;

    /// Models this provider can serve, in price-table order.
    fn available_models(&self) -> Vec<String>;

    /// The model used when a request does not name one.
    fn default_model(&self) -> &str;

    /// Cost in USD for a token usage pair on `model`.
    ///
    /// Unrecognized models fall back to the default model's pricing.
    fn calculate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> Decimal;

    /// Generate content.
    ///
    /// # Errors
    /// Real API failures propagate unmodified. The missing-credentials case
    /// never errors; it is served by the mock path instead.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError>;
}
