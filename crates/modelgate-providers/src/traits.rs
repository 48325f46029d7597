//! Model provider trait — the interface every vendor adapter implements.

use async_trait::async_trait;
use modelgate_core::{GenerationRequest, ModelResponse, ProviderType};

use crate::capabilities::ModelCapabilities;
use crate::error::ProviderError;

/// Rough token count used when no vendor tokenizer is available:
/// four characters per token.
pub fn estimate_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count() / 4).unwrap_or(u32::MAX)
}

/// Trait that all model providers implement.
///
/// Implementations are `Send + Sync` so one instance can be shared across
/// tasks behind an `Arc`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Display name for logs and responses.
    fn friendly_name(&self) -> &str;

    /// Base URL this instance sends requests to.
    fn base_url(&self) -> &str;

    /// Capabilities of a model, after alias resolution.
    ///
    /// Fails with [`ProviderError::UnsupportedModel`] for unknown names and
    /// [`ProviderError::ModelNotAllowed`] when the restriction policy says no.
    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, ProviderError>;

    /// Whether this provider both supports and allows the model.
    fn validate_model_name(&self, model_name: &str) -> bool;

    fn supports_thinking_mode(&self, model_name: &str) -> bool {
        self.get_capabilities(model_name)
            .map(|caps| caps.supports_extended_thinking)
            .unwrap_or(false)
    }

    /// Canonical model names this provider serves.
    fn list_models(&self) -> Vec<String> {
        Vec::new()
    }

    /// Generate a completion for one prompt.
    ///
    /// Transport and HTTP errors from the vendor are returned unchanged.
    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ModelResponse, ProviderError>;

    /// Count tokens in `text` for the given model.
    async fn count_tokens(&self, text: &str, _model_name: &str) -> Result<u32, ProviderError> {
        Ok(estimate_tokens(text))
    }
}
