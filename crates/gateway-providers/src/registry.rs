//! Provider registry and gateway orchestrator.

use gateway_core::{GatewayError, GenerationRequest, GenerationResponse, LlmProvider};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

use crate::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::google::{GoogleConfig, GoogleProvider};
use crate::openai::{OpenAiConfig, OpenAiProvider};
use crate::xai::{XaiConfig, XaiProvider};

/// Gateway over a fixed set of LLM providers.
///
/// The registry is built once at startup and never mutated; callers address
/// providers by name and receive the uniform [`GenerationResponse`] contract
/// regardless of which backend served the request.
pub struct LlmGateway {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl LlmGateway {
    /// Build a gateway over an explicit provider list.
    ///
    /// Registration order is preserved and is the order reported by
    /// [`all_providers`](Self::all_providers).
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// Build the standard four-provider registry from optional API keys.
    ///
    /// # Errors
    /// Returns an error if any provider's HTTP client cannot be constructed.
    pub fn with_standard_providers(
        openai_key: Option<SecretString>,
        anthropic_key: Option<SecretString>,
        google_key: Option<SecretString>,
        xai_key: Option<SecretString>,
    ) -> Result<Self, GatewayError> {
        let providers: Vec<Arc<dyn LlmProvider>> = vec![
            Arc::new(OpenAiProvider::new(OpenAiConfig::new(openai_key))?),
            Arc::new(AnthropicProvider::new(AnthropicConfig::new(anthropic_key))?),
            Arc::new(GoogleProvider::new(GoogleConfig::new(google_key))?),
            Arc::new(XaiProvider::new(XaiConfig::new(xai_key))?),
        ];
        Ok(Self::new(providers))
    }

    /// Look up a provider by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn LlmProvider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Names of providers with configured credentials.
    #[must_use]
    pub fn available_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Names of all registered providers, available or not.
    #[must_use]
    pub fn all_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Models served by a provider; empty for unknown names.
    #[must_use]
    pub fn provider_models(&self, name: &str) -> Vec<String> {
        self.get(name).map(|p| p.available_models()).unwrap_or_default()
    }

    /// Generate content through the named provider.
    ///
    /// No retry logic lives here: a single provider call either succeeds or
    /// its failure propagates to the caller.
    ///
    /// # Errors
    /// `InvalidProvider` for unknown names; provider failures pass through.
    pub async fn generate(
        &self,
        provider_name: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let provider = self.get(provider_name).ok_or_else(|| {
            GatewayError::InvalidProvider {
                name: provider_name.to_string(),
                available: self.all_providers(),
            }
        })?;

        info!(
            provider = provider_name,
            model = request.model.as_deref().unwrap_or("default"),
            "Generating content"
        );

        let response = provider.generate(request).await?;

        info!(
            provider = provider_name,
            model = %response.model,
            total_tokens = response.total_tokens,
            cost_usd = %response.cost_usd,
            "Generation complete"
        );

        Ok(response)
    }
}
