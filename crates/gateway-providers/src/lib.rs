//! # Gateway Providers
//!
//! LLM provider implementations for the SEO platform gateway:
//! - OpenAI (chat completions)
//! - Anthropic (messages)
//! - Google AI (Gemini)
//! - xAI (Grok, OpenAI-compatible)
//!
//! Every provider implements [`gateway_core::LlmProvider`]. A provider
//! without configured credentials stays registered and serves deterministic
//! mock responses so downstream cost accounting remains exercisable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod google;
mod mock;
pub mod openai;
pub mod registry;
pub mod xai;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;
pub use registry::LlmGateway;
pub use xai::XaiProvider;
