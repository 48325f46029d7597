//! Adapter for vendors speaking the OpenAI chat completions protocol.
//!
//! OpenAI, X.AI and DIAL are all this one type, parameterized by a static
//! [`VendorSpec`]. The vendor modules hold the specs and capability tables.

use std::sync::Arc;

use async_trait::async_trait;
use modelgate_core::{
    EndpointConfig, EndpointOverride, GenerationRequest, ModelResponse, ProviderType,
};
use tracing::info;

use crate::capabilities::{ModelCapabilities, ModelCatalog};
use crate::error::ProviderError;
use crate::http_client::{
    build_chat_request, into_model_response, AuthStyle, CompletionsRoute,
    OpenAiCompatibleClient,
};
use crate::restrictions::RestrictionPolicy;
use crate::traits::ModelProvider;

/// Static description of one OpenAI-compatible vendor.
#[derive(Debug)]
pub struct VendorSpec {
    pub provider_type: ProviderType,
    pub default_base_url: &'static str,
    pub auth: AuthStyle,
    /// Set for vendors that route per deployment; the default `api-version`.
    pub deployment_api_version: Option<&'static str>,
    pub models: &'static [ModelCapabilities],
}

impl VendorSpec {
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.provider_type, self.models)
    }

    /// Endpoint override namespace, e.g. `"openai"`.
    pub fn namespace(&self) -> &'static str {
        self.provider_type.as_str()
    }
}

/// The override a call for `model_name` must be sent to, if it differs from
/// the base URL or API key this instance already uses.
pub(crate) fn call_override<'a>(
    endpoints: &'a EndpointConfig,
    model_name: &str,
    current_base_url: &str,
    current_api_key: &str,
) -> Option<&'a EndpointOverride> {
    endpoints.get_endpoint_for_model(model_name).filter(|ep| {
        ep.base_url.trim_end_matches('/') != current_base_url.trim_end_matches('/')
            || ep.api_key_or(current_api_key) != current_api_key
    })
}

// ─────────────────────────────────────────────
// OpenAiCompatibleProvider
// ─────────────────────────────────────────────

pub struct OpenAiCompatibleProvider {
    spec: &'static VendorSpec,
    api_key: String,
    api_version: Option<String>,
    client: OpenAiCompatibleClient,
    endpoints: Arc<EndpointConfig>,
    policy: Arc<dyn RestrictionPolicy>,
    custom_endpoint: bool,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("provider", &self.spec.provider_type)
            .field("base_url", &self.client.base_url())
            .field("custom_endpoint", &self.custom_endpoint)
            .finish()
    }
}

impl OpenAiCompatibleProvider {
    /// Create an adapter.
    ///
    /// When `model_name` has an endpoint override, the client is bound to the
    /// override's base URL and its API key replaces `api_key` if non-empty.
    /// Otherwise the vendor's default base URL is used.
    pub fn new(
        spec: &'static VendorSpec,
        api_key: &str,
        model_name: Option<&str>,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
    ) -> Result<Self, ProviderError> {
        let bound = model_name
            .and_then(|model| endpoints.get_endpoint_for_model(model).map(|ep| (model, ep.clone())));

        let (base_url, key, custom) = match bound {
            Some((model, ep)) => {
                info!(
                    provider = %spec.provider_type,
                    model,
                    base_url = %ep.base_url,
                    "using custom endpoint"
                );
                let key = ep.api_key_or(api_key).to_string();
                (ep.base_url, key, true)
            }
            None => (spec.default_base_url.to_string(), api_key.to_string(), false),
        };

        Self::build(
            spec,
            &base_url,
            key,
            spec.deployment_api_version.map(String::from),
            endpoints,
            policy,
            custom,
        )
    }

    /// Create an adapter against an explicit base URL.
    pub fn with_base_url(
        spec: &'static VendorSpec,
        base_url: &str,
        api_key: &str,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
    ) -> Result<Self, ProviderError> {
        Self::build(
            spec,
            base_url,
            api_key.to_string(),
            spec.deployment_api_version.map(String::from),
            endpoints,
            policy,
            false,
        )
    }

    /// Route requests per deployment with the given `api-version`.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        let api_version = api_version.into();
        self.client = self.client.with_route(CompletionsRoute::Deployment {
            api_version: api_version.clone(),
        });
        self.api_version = Some(api_version);
        self
    }

    fn build(
        spec: &'static VendorSpec,
        base_url: &str,
        api_key: String,
        api_version: Option<String>,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
        custom_endpoint: bool,
    ) -> Result<Self, ProviderError> {
        let mut client = OpenAiCompatibleClient::new(base_url, &api_key)?.with_auth(spec.auth);
        if let Some(version) = &api_version {
            client = client.with_route(CompletionsRoute::Deployment {
                api_version: version.clone(),
            });
        }

        Ok(Self {
            spec,
            api_key,
            api_version,
            client,
            endpoints,
            policy,
            custom_endpoint,
        })
    }

    /// A short-lived adapter bound to `endpoint`, sharing this one's
    /// configuration.
    fn transient(&self, endpoint: &EndpointOverride) -> Result<Self, ProviderError> {
        Self::build(
            self.spec,
            &endpoint.base_url,
            endpoint.api_key_or(&self.api_key).to_string(),
            self.api_version.clone(),
            Arc::clone(&self.endpoints),
            Arc::clone(&self.policy),
            true,
        )
    }

    pub fn spec(&self) -> &'static VendorSpec {
        self.spec
    }

    /// Whether this instance is bound to an endpoint override.
    pub fn uses_custom_endpoint(&self) -> bool {
        self.custom_endpoint
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Call the vendor with `canonical` as the model, on this instance's client.
    async fn generate_direct(
        &self,
        request: &GenerationRequest,
        canonical: &str,
    ) -> Result<ModelResponse, ProviderError> {
        let caps = self.spec.catalog().capabilities_for_call(
            &request.model_name,
            self.policy.as_ref(),
            self.custom_endpoint,
        )?;

        let body = build_chat_request(request, canonical, caps);
        let response = self.client.chat(&body).await?;
        into_model_response(response, canonical, self.friendly_name(), self.spec.provider_type)
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn provider_type(&self) -> ProviderType {
        self.spec.provider_type
    }

    fn friendly_name(&self) -> &str {
        self.spec.provider_type.display_name()
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, ProviderError> {
        self.spec
            .catalog()
            .get_capabilities(model_name, self.policy.as_ref())
            .cloned()
    }

    fn validate_model_name(&self, model_name: &str) -> bool {
        self.spec
            .catalog()
            .validate_model_name(model_name, self.policy.as_ref())
    }

    fn list_models(&self) -> Vec<String> {
        self.spec
            .models
            .iter()
            .filter(|m| {
                self.policy
                    .is_allowed(self.spec.provider_type, &m.model_name, &m.model_name)
            })
            .map(|m| m.model_name.to_string())
            .collect()
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ModelResponse, ProviderError> {
        let canonical = self.spec.catalog().resolve_model_name(&request.model_name);

        if let Some(endpoint) = call_override(
            &self.endpoints,
            &request.model_name,
            self.base_url(),
            &self.api_key,
        ) {
            info!(
                provider = %self.spec.provider_type,
                model = %request.model_name,
                resolved = %canonical,
                base_url = %endpoint.base_url,
                "using custom endpoint"
            );
            return self.transient(endpoint)?.generate_direct(request, &canonical).await;
        }

        info!(
            provider = %self.spec.provider_type,
            model = %request.model_name,
            resolved = %canonical,
            base_url = %self.base_url(),
            endpoint = if self.custom_endpoint { "custom" } else { "default" },
            "sending request"
        );
        self.generate_direct(request, &canonical).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::OPENAI;
    use crate::restrictions::{AllowAll, EnvRestrictionPolicy};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn ok_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "content": content }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        })
    }

    fn endpoints_with(model: &str, base_url: &str, api_key: &str) -> Arc<EndpointConfig> {
        let mut config = EndpointConfig::new("openai");
        config.insert(model, EndpointOverride::new(base_url, api_key));
        Arc::new(config)
    }

    #[test]
    fn test_default_base_url() {
        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            Some("o3"),
            Arc::new(EndpointConfig::new("openai")),
            Arc::new(AllowAll),
        )
        .unwrap();
        assert_eq!(provider.base_url(), "https://api.openai.com/v1");
        assert!(!provider.uses_custom_endpoint());
    }

    #[test]
    fn test_construction_binds_override() {
        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            Some("o3"),
            endpoints_with("o3", "https://proxy.internal/v1", ""),
            Arc::new(AllowAll),
        )
        .unwrap();
        assert_eq!(provider.base_url(), "https://proxy.internal/v1");
        assert!(provider.uses_custom_endpoint());
    }

    #[tokio::test]
    async fn test_override_key_replaces_supplied_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer override-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("hi")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            Some("o3"),
            endpoints_with("o3", &mock_server.uri(), "override-key"),
            Arc::new(AllowAll),
        )
        .unwrap();
        let resp = provider
            .generate_content(&GenerationRequest::new("ping", "o3"))
            .await
            .unwrap();
        assert_eq!(resp.content, "hi");
    }

    #[tokio::test]
    async fn test_empty_override_key_keeps_supplied_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("hi")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            Some("o3"),
            endpoints_with("o3", &mock_server.uri(), ""),
            Arc::new(AllowAll),
        )
        .unwrap();
        provider
            .generate_content(&GenerationRequest::new("ping", "o3"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_alias_resolved_and_temperature_omitted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "model": "o3-mini" })))
            .and(|req: &Request| {
                serde_json::from_slice::<serde_json::Value>(&req.body)
                    .map(|body| body.get("temperature").is_none())
                    .unwrap_or(false)
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("done")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiCompatibleProvider::with_base_url(
            &OPENAI,
            &mock_server.uri(),
            "sk-test",
            Arc::new(EndpointConfig::new("openai")),
            Arc::new(AllowAll),
        )
        .unwrap();
        let resp = provider
            .generate_content(&GenerationRequest::new("ping", "o3mini").with_temperature(0.2))
            .await
            .unwrap();

        assert_eq!(resp.model_name, "o3-mini");
        assert_eq!(resp.friendly_name, "OpenAI");
        assert_eq!(resp.provider, ProviderType::OpenAI);
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(5));
    }

    #[tokio::test]
    async fn test_request_routed_to_transient_adapter() {
        let default_server = MockServer::start().await;
        let custom_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("default")))
            .expect(0)
            .mount(&default_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer team-key"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4.1-2025-04-14" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("custom")))
            .expect(1)
            .mount(&custom_server)
            .await;

        let provider = OpenAiCompatibleProvider::with_base_url(
            &OPENAI,
            &default_server.uri(),
            "sk-test",
            endpoints_with("gpt4.1", &custom_server.uri(), "team-key"),
            Arc::new(AllowAll),
        )
        .unwrap();
        let resp = provider
            .generate_content(&GenerationRequest::new("ping", "gpt4.1"))
            .await
            .unwrap();

        assert_eq!(resp.content, "custom");
        // The shared instance is untouched
        assert_eq!(provider.base_url(), default_server.uri());
    }

    #[tokio::test]
    async fn test_unlisted_model_allowed_on_custom_endpoint_only() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "model": "my-finetune" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("tuned")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            None,
            endpoints_with("my-finetune", &mock_server.uri(), ""),
            Arc::new(AllowAll),
        )
        .unwrap();

        let resp = provider
            .generate_content(&GenerationRequest::new("ping", "my-finetune"))
            .await
            .unwrap();
        assert_eq!(resp.content, "tuned");

        let err = provider
            .generate_content(&GenerationRequest::new("ping", "not-a-model"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedModel { .. }));
    }

    #[tokio::test]
    async fn test_restricted_model_rejected_before_network() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("nope")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let policy = EnvRestrictionPolicy::from_vars([("OPENAI_ALLOWED_MODELS", "o4-mini")]);
        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            None,
            endpoints_with("o3", &mock_server.uri(), ""),
            Arc::new(policy),
        )
        .unwrap();

        let err = provider
            .generate_content(&GenerationRequest::new("ping", "o3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotAllowed { .. }));
        assert!(!provider.validate_model_name("o3"));
        assert!(provider.validate_model_name("mini"));
        assert_eq!(provider.list_models(), vec!["o4-mini".to_string()]);
    }

    #[tokio::test]
    async fn test_shared_proxy_uses_each_models_key() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer key-mini"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("mini")))
            .expect(1)
            .mount(&proxy)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer key-o3"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&proxy)
            .await;

        let mut config = EndpointConfig::new("openai");
        config.insert("o3", EndpointOverride::new(proxy.uri(), "key-o3"));
        config.insert("o3-mini", EndpointOverride::new(proxy.uri(), "key-mini"));

        let provider = OpenAiCompatibleProvider::new(
            &OPENAI,
            "sk-test",
            Some("o3"),
            Arc::new(config),
            Arc::new(AllowAll),
        )
        .unwrap();
        assert_eq!(provider.base_url(), proxy.uri());

        let resp = provider
            .generate_content(&GenerationRequest::new("ping", "o3-mini"))
            .await
            .unwrap();
        assert_eq!(resp.content, "mini");
    }

    #[test]
    fn test_call_override_compares_url_and_key() {
        let mut config = EndpointConfig::new("openai");
        config.insert("o3", EndpointOverride::new("https://proxy/v1", "key-o3"));
        config.insert("o4-mini", EndpointOverride::new("https://proxy/v1/", ""));

        assert!(call_override(&config, "o3", "https://proxy/v1", "key-o3").is_none());
        assert!(call_override(&config, "o3", "https://proxy/v1", "other").is_some());
        assert!(call_override(&config, "o3", "https://elsewhere/v1", "key-o3").is_some());
        // An empty override key inherits the current one
        assert!(call_override(&config, "o4-mini", "https://proxy/v1", "any").is_none());
        assert!(call_override(&config, "gpt-4.1", "https://proxy/v1", "any").is_none());
    }
}
