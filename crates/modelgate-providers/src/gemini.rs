//! Google Gemini adapter.
//!
//! Speaks the native `generativelanguage` REST API:
//! `POST {base}/v1beta/models/{model}:generateContent` and `:countTokens`,
//! authenticated with an `x-goog-api-key` header.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use modelgate_core::{
    EndpointConfig, EndpointOverride, GenerationRequest, ModelResponse, ProviderType, UsageInfo,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::capabilities::{ModelCapabilities, ModelCatalog, TemperatureConstraint};
use crate::error::ProviderError;
use crate::openai_compatible::call_override;
use crate::restrictions::RestrictionPolicy;
use crate::traits::ModelProvider;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION_PATH: &str = "v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub static GEMINI_MODELS: [ModelCapabilities; 4] = [
    ModelCapabilities {
        provider: ProviderType::Google,
        model_name: Cow::Borrowed("gemini-2.0-flash"),
        friendly_name: Cow::Borrowed("Gemini (Flash 2.0)"),
        context_window: 1_048_576,
        max_output_tokens: 65_536,
        supports_extended_thinking: true,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "Gemini 2.0 Flash (1M context) - Latest fast model with experimental thinking",
        ),
        aliases: &["flash-2.0", "flash2"],
    },
    ModelCapabilities {
        provider: ProviderType::Google,
        model_name: Cow::Borrowed("gemini-2.0-flash-lite"),
        friendly_name: Cow::Borrowed("Gemini (Flash Lite 2.0)"),
        context_window: 1_048_576,
        max_output_tokens: 65_536,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: false,
        max_image_size_mb: None,
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "Gemini 2.0 Flash Lite (1M context) - Lightweight fast model, text-only",
        ),
        aliases: &["flashlite", "flash-lite"],
    },
    ModelCapabilities {
        provider: ProviderType::Google,
        model_name: Cow::Borrowed("gemini-2.5-flash"),
        friendly_name: Cow::Borrowed("Gemini (Flash 2.5)"),
        context_window: 1_048_576,
        max_output_tokens: 65_536,
        supports_extended_thinking: true,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "Ultra-fast (1M context) - Quick analysis, simple queries, rapid iterations",
        ),
        aliases: &["flash", "flash2.5"],
    },
    ModelCapabilities {
        provider: ProviderType::Google,
        model_name: Cow::Borrowed("gemini-2.5-pro"),
        friendly_name: Cow::Borrowed("Gemini (Pro 2.5)"),
        context_window: 1_048_576,
        max_output_tokens: 65_536,
        supports_extended_thinking: true,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(32.0),
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "Deep reasoning + thinking mode (1M context) - Complex problems, architecture, deep analysis",
        ),
        aliases: &["pro", "gemini pro", "gemini-pro"],
    },
];

pub fn gemini_catalog() -> ModelCatalog {
    ModelCatalog::new(ProviderType::Google, &GEMINI_MODELS)
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<UsageMetadata> for UsageInfo {
    fn from(usage: UsageMetadata) -> Self {
        let mut info = UsageInfo::new(usage.prompt_token_count, usage.candidates_token_count);
        if usage.total_token_count > 0 {
            info.total_tokens = usage.total_token_count;
        }
        info
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Serialize)]
struct CountTokensRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    total_tokens: u32,
}

fn build_request(
    request: &GenerationRequest,
    caps: Option<&ModelCapabilities>,
) -> GenerateContentRequest {
    let system_instruction = request
        .system_prompt
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| Content {
            role: None,
            parts: vec![Part {
                text: s.to_string(),
            }],
        });

    let temperature = match caps {
        Some(caps) => caps.effective_temperature(request.temperature),
        None => Some(request.temperature),
    };
    let max_output_tokens = match (request.max_output_tokens, caps) {
        (Some(n), Some(caps)) => Some(n.min(caps.max_output_tokens)),
        (n, _) => n,
    };

    GenerateContentRequest {
        contents: vec![Content::user(&request.prompt)],
        system_instruction,
        generation_config: GenerationConfig {
            temperature,
            max_output_tokens,
        },
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    endpoints: Arc<EndpointConfig>,
    policy: Arc<dyn RestrictionPolicy>,
    custom_endpoint: bool,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("custom_endpoint", &self.custom_endpoint)
            .finish()
    }
}

impl GeminiProvider {
    /// Create an adapter, bound to `model_name`'s endpoint override if it has
    /// one. The override key replaces `api_key` only when non-empty.
    pub fn new(
        api_key: &str,
        model_name: Option<&str>,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
    ) -> Result<Self, ProviderError> {
        let bound = model_name
            .and_then(|model| endpoints.get_endpoint_for_model(model).map(|ep| (model, ep.clone())));

        match bound {
            Some((model, ep)) => {
                info!(provider = "google", model, base_url = %ep.base_url, "using custom endpoint");
                let key = ep.api_key_or(api_key).to_string();
                Self::build(&ep.base_url, key, endpoints, policy, true)
            }
            None => Self::build(GEMINI_DEFAULT_BASE_URL, api_key.to_string(), endpoints, policy, false),
        }
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
    ) -> Result<Self, ProviderError> {
        Self::build(base_url, api_key.to_string(), endpoints, policy, false)
    }

    fn build(
        base_url: &str,
        api_key: String,
        endpoints: Arc<EndpointConfig>,
        policy: Arc<dyn RestrictionPolicy>,
        custom_endpoint: bool,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            endpoints,
            policy,
            custom_endpoint,
        })
    }

    fn transient(&self, endpoint: &EndpointOverride) -> Result<Self, ProviderError> {
        Self::build(
            &endpoint.base_url,
            endpoint.api_key_or(&self.api_key).to_string(),
            Arc::clone(&self.endpoints),
            Arc::clone(&self.policy),
            true,
        )
    }

    /// A transient adapter when `model_name` must go to another endpoint.
    fn for_call(&self, model_name: &str) -> Result<Option<Self>, ProviderError> {
        match call_override(&self.endpoints, model_name, &self.base_url, &self.api_key) {
            Some(endpoint) => {
                info!(
                    provider = "google",
                    model = model_name,
                    base_url = %endpoint.base_url,
                    "using custom endpoint"
                );
                self.transient(endpoint).map(Some)
            }
            None => {
                info!(
                    provider = "google",
                    model = model_name,
                    base_url = %self.base_url,
                    endpoint = if self.custom_endpoint { "custom" } else { "default" },
                    "sending request"
                );
                Ok(None)
            }
        }
    }

    pub fn uses_custom_endpoint(&self) -> bool {
        self.custom_endpoint
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            API_VERSION_PATH,
            model,
            method
        )
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        debug!(url, "sending Gemini request");
        let mut request = self.client.post(url).json(body);
        if !self.api_key.is_empty() {
            request = request.header("x-goog-api-key", &self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "Gemini API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<R>().await?)
    }

    async fn generate_direct(
        &self,
        request: &GenerationRequest,
        canonical: &str,
    ) -> Result<ModelResponse, ProviderError> {
        let caps = gemini_catalog().capabilities_for_call(
            &request.model_name,
            self.policy.as_ref(),
            self.custom_endpoint,
        )?;

        let body = build_request(request, caps);
        let url = self.model_url(canonical, "generateContent");
        let response: GenerateContentResponse = self.post(&url, &body).await?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("No candidates in Gemini response".to_string())
        })?;

        Ok(ModelResponse {
            content: candidate.content.map(|c| c.text()).unwrap_or_default(),
            usage: response.usage_metadata.map(Into::into),
            model_name: canonical.to_string(),
            friendly_name: self.friendly_name().to_string(),
            provider: ProviderType::Google,
            finish_reason: candidate.finish_reason,
        })
    }

    async fn count_tokens_direct(&self, text: &str, canonical: &str) -> Result<u32, ProviderError> {
        let url = self.model_url(canonical, "countTokens");
        let body = CountTokensRequest {
            contents: vec![Content::user(text)],
        };
        let response: CountTokensResponse = self.post(&url, &body).await?;
        Ok(response.total_tokens)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Google
    }

    fn friendly_name(&self) -> &str {
        ProviderType::Google.display_name()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, ProviderError> {
        gemini_catalog()
            .get_capabilities(model_name, self.policy.as_ref())
            .cloned()
    }

    fn validate_model_name(&self, model_name: &str) -> bool {
        gemini_catalog().validate_model_name(model_name, self.policy.as_ref())
    }

    fn list_models(&self) -> Vec<String> {
        GEMINI_MODELS
            .iter()
            .filter(|m| {
                self.policy
                    .is_allowed(ProviderType::Google, &m.model_name, &m.model_name)
            })
            .map(|m| m.model_name.to_string())
            .collect()
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ModelResponse, ProviderError> {
        let canonical = gemini_catalog().resolve_model_name(&request.model_name);
        match self.for_call(&request.model_name)? {
            Some(transient) => transient.generate_direct(request, &canonical).await,
            None => self.generate_direct(request, &canonical).await,
        }
    }

    async fn count_tokens(&self, text: &str, model_name: &str) -> Result<u32, ProviderError> {
        let canonical = gemini_catalog().resolve_model_name(model_name);
        match call_override(&self.endpoints, model_name, &self.base_url, &self.api_key) {
            Some(endpoint) => self.transient(endpoint)?.count_tokens_direct(text, &canonical).await,
            None => self.count_tokens_direct(text, &canonical).await,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
