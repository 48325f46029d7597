//! Adapter for any OpenAI-compatible endpoint (local servers, proxies,
//! self-hosted models).
//!
//! There is no capability table: every non-empty model name is accepted and
//! described with [`ModelCapabilities::generic`].

use async_trait::async_trait;
use modelgate_core::{GenerationRequest, ModelResponse, ProviderType};
use tracing::info;

use crate::capabilities::ModelCapabilities;
use crate::error::ProviderError;
use crate::http_client::{build_chat_request, into_model_response, OpenAiCompatibleClient};
use crate::traits::ModelProvider;

#[derive(Debug)]
pub struct CustomProvider {
    client: OpenAiCompatibleClient,
}

impl CustomProvider {
    /// `api_key` may be empty for endpoints without auth.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ProviderError> {
        if base_url.trim().is_empty() {
            return Err(ProviderError::MissingConfiguration(
                "custom provider requires a base URL (CUSTOM_API_URL)".to_string(),
            ));
        }
        Ok(Self {
            client: OpenAiCompatibleClient::new(base_url, api_key)?,
        })
    }

    pub fn api_key(&self) -> &str {
        self.client.api_key()
    }
}

#[async_trait]
impl ModelProvider for CustomProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Custom
    }

    fn friendly_name(&self) -> &str {
        ProviderType::Custom.display_name()
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, ProviderError> {
        if model_name.trim().is_empty() {
            return Err(ProviderError::UnsupportedModel {
                provider: ProviderType::Custom,
                model: model_name.to_string(),
            });
        }
        Ok(ModelCapabilities::generic(ProviderType::Custom, model_name))
    }

    fn validate_model_name(&self, model_name: &str) -> bool {
        !model_name.trim().is_empty()
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ModelResponse, ProviderError> {
        let caps = self.get_capabilities(&request.model_name)?;
        info!(
            provider = "custom",
            model = %request.model_name,
            base_url = %self.base_url(),
            "sending request"
        );

        let body = build_chat_request(request, &request.model_name, Some(&caps));
        let response = self.client.chat(&body).await?;
        into_model_response(
            response,
            &request.model_name,
            self.friendly_name(),
            ProviderType::Custom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_requires_base_url() {
        let err = CustomProvider::new("  ", "").unwrap_err();
        assert!(matches!(err, ProviderError::MissingConfiguration(_)));
    }

    #[test]
    fn test_accepts_any_model() {
        let provider = CustomProvider::new("http://localhost:11434/v1", "").unwrap();
        assert!(provider.validate_model_name("llama3.2"));
        assert!(provider.validate_model_name("whatever/custom:latest"));
        assert!(!provider.validate_model_name(""));
        assert!(!provider.supports_thinking_mode("llama3.2"));
        assert_eq!(
            provider.get_capabilities("llama3.2").unwrap().model_name,
            "llama3.2"
        );
    }

    #[tokio::test]
    async fn test_generate_without_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2",
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "local" }, "finish_reason": "stop" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = CustomProvider::new(&format!("{}/v1", mock_server.uri()), "").unwrap();
        let resp = provider
            .generate_content(&GenerationRequest::new("hi", "llama3.2"))
            .await
            .unwrap();

        assert_eq!(resp.content, "local");
        assert_eq!(resp.friendly_name, "Custom API");
        assert_eq!(resp.provider, ProviderType::Custom);
    }
}
