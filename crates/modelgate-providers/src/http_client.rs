//! HTTP client for OpenAI-compatible `/chat/completions` APIs.
//!
//! Shared by the OpenAI, X.AI, DIAL and custom adapters. DIAL differs only in
//! its URL layout (per-deployment path plus `api-version`) and auth header.

use std::time::Duration;

use modelgate_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, Message,
};
use modelgate_core::{GenerationRequest, ModelResponse, ProviderType};
use tracing::{debug, error};

use crate::capabilities::ModelCapabilities;
use crate::error::ProviderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// How the API key is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// A named header carrying the raw key (e.g. DIAL's `Api-Key`).
    Header(&'static str),
}

/// URL layout of the completions endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionsRoute {
    /// `{base}/chat/completions`
    ChatCompletions,
    /// `{base}/openai/deployments/{model}/chat/completions?api-version={v}`
    Deployment { api_version: String },
}

// ─────────────────────────────────────────────
// OpenAiCompatibleClient
// ─────────────────────────────────────────────

/// A client bound to one base URL and API key.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    auth: AuthStyle,
    route: CompletionsRoute,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("route", &self.route)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            auth: AuthStyle::Bearer,
            route: CompletionsRoute::ChatCompletions,
        })
    }

    pub fn with_auth(mut self, auth: AuthStyle) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_route(mut self, route: CompletionsRoute) -> Self {
        self.route = route;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn auth(&self) -> AuthStyle {
        self.auth
    }

    pub fn route(&self) -> &CompletionsRoute {
        &self.route
    }

    /// Full completions URL for a model.
    pub fn completions_url(&self, model: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.route {
            CompletionsRoute::ChatCompletions => format!("{}/chat/completions", base),
            CompletionsRoute::Deployment { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, model, api_version
            ),
        }
    }

    /// Send one chat completion request.
    pub async fn chat(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = self.completions_url(&body.model);
        debug!(url = %url, model = %body.model, "sending chat completion");

        let mut request = self.client.post(&url).json(body);
        if !self.api_key.is_empty() {
            request = match self.auth {
                AuthStyle::Bearer => request.bearer_auth(&self.api_key),
                AuthStyle::Header(name) => request.header(name, &self.api_key),
            };
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<ChatCompletionResponse>().await?)
    }
}

// ─────────────────────────────────────────────
// Request / response mapping
// ─────────────────────────────────────────────

/// Build the wire request for a generation call.
///
/// Without capabilities (an unlisted model on a custom endpoint) the
/// temperature is sent as given and a system prompt is always included.
pub fn build_chat_request(
    request: &GenerationRequest,
    model: &str,
    caps: Option<&ModelCapabilities>,
) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        let supports_system = caps.map_or(true, |c| c.supports_system_prompts);
        if supports_system {
            messages.push(Message::system(system));
        } else {
            debug!(model, "model has no system prompt support, folding into user prompt");
            messages.push(Message::user(format!("{}\n\n{}", system, request.prompt)));
            return finish_request(request, model, caps, messages);
        }
    }
    messages.push(Message::user(request.prompt.clone()));
    finish_request(request, model, caps, messages)
}

fn finish_request(
    request: &GenerationRequest,
    model: &str,
    caps: Option<&ModelCapabilities>,
    messages: Vec<Message>,
) -> ChatCompletionRequest {
    let temperature = match caps {
        Some(caps) => caps.effective_temperature(request.temperature),
        None => Some(request.temperature),
    };
    let max_tokens = match (request.max_output_tokens, caps) {
        (Some(n), Some(caps)) => Some(n.min(caps.max_output_tokens)),
        (n, _) => n,
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        max_tokens,
        temperature,
    }
}

/// Normalize a chat completion into a [`ModelResponse`].
pub fn into_model_response(
    response: ChatCompletionResponse,
    model: &str,
    friendly_name: &str,
    provider: ProviderType,
) -> Result<ModelResponse, ProviderError> {
    let usage = response.usage.map(Into::into);
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    Ok(ModelResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        model_name: model.to_string(),
        friendly_name: friendly_name.to_string(),
        provider,
        finish_reason: choice.finish_reason,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
