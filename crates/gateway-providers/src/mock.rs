//! Deterministic mock responses for providers without credentials.

use gateway_core::GenerationResponse;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Build a synthetic response derived from the prompt.
///
/// Token counts are approximated from whitespace-delimited word counts
/// (a documented estimate, not a real tokenizer); the cost is computed
/// with the same decimal formula a live call would use.
pub(crate) fn mock_response<F>(
    provider: &str,
    model: &str,
    prompt: &str,
    calculate_cost: F,
) -> GenerationResponse
where
    F: FnOnce(u32, u32) -> Decimal,
{
    let preview: String = prompt.chars().take(100).collect();
    let content = format!("Mock {provider} response for: {preview}...");

    let input_tokens = (prompt.split_whitespace().count() * 2) as u32;
    let output_tokens = (content.split_whitespace().count() * 2) as u32;
    let cost_usd = calculate_cost(input_tokens, output_tokens);

    let mut metadata = Map::new();
    metadata.insert("mock".to_string(), Value::Bool(true));

    GenerationResponse {
        content,
        model: format!("{model}-mock"),
        provider: provider.to_string(),
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
        cost_usd,
        metadata,
    }
}
