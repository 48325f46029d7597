//! DIAL models.
//!
//! DIAL fronts several vendors behind one OpenAI-compatible gateway. Each
//! model is a deployment with its own URL path, and the key goes in an
//! `Api-Key` header.

use std::borrow::Cow;

use modelgate_core::ProviderType;

use crate::capabilities::{ModelCapabilities, TemperatureConstraint};
use crate::http_client::AuthStyle;
use crate::openai_compatible::VendorSpec;

pub const DIAL_DEFAULT_BASE_URL: &str = "https://core.dialx.ai";
pub const DIAL_DEFAULT_API_VERSION: &str = "2024-12-01-preview";

#[allow(clippy::too_many_arguments)]
const fn dial_model(
    model_name: &'static str,
    friendly_name: &'static str,
    context_window: u32,
    max_output_tokens: u32,
    thinking: bool,
    max_image_size_mb: f32,
    temperature: Option<TemperatureConstraint>,
    description: &'static str,
    aliases: &'static [&'static str],
) -> ModelCapabilities {
    let (supports_temperature, temperature_constraint) = match temperature {
        Some(constraint) => (true, constraint),
        None => (false, TemperatureConstraint::fixed()),
    };
    ModelCapabilities {
        provider: ProviderType::DIAL,
        model_name: Cow::Borrowed(model_name),
        friendly_name: Cow::Borrowed(friendly_name),
        context_window,
        max_output_tokens,
        supports_extended_thinking: thinking,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: false,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(max_image_size_mb),
        supports_temperature,
        temperature_constraint,
        description: Cow::Borrowed(description),
        aliases,
    }
}

pub static DIAL_MODELS: [ModelCapabilities; 7] = [
    dial_model(
        "o3-2025-04-16",
        "DIAL (O3)",
        200_000,
        100_000,
        false,
        20.0,
        None,
        "OpenAI O3 via DIAL - Strong reasoning model",
        &["o3"],
    ),
    dial_model(
        "o4-mini-2025-04-16",
        "DIAL (O4-mini)",
        200_000,
        100_000,
        false,
        20.0,
        None,
        "OpenAI O4-mini via DIAL - Fast reasoning model",
        &["o4-mini"],
    ),
    dial_model(
        "anthropic.claude-sonnet-4-20250514-v1:0",
        "DIAL (Sonnet 4)",
        200_000,
        64_000,
        false,
        5.0,
        Some(TemperatureConstraint::range()),
        "Claude Sonnet 4 via DIAL - Balanced performance",
        &["sonnet-4"],
    ),
    dial_model(
        "anthropic.claude-sonnet-4-20250514-v1:0-with-thinking",
        "DIAL (Sonnet 4 Thinking)",
        200_000,
        64_000,
        true,
        5.0,
        Some(TemperatureConstraint::range()),
        "Claude Sonnet 4 with thinking mode via DIAL",
        &["sonnet-4-thinking"],
    ),
    dial_model(
        "anthropic.claude-opus-4-20250514-v1:0",
        "DIAL (Opus 4)",
        200_000,
        64_000,
        false,
        5.0,
        Some(TemperatureConstraint::range()),
        "Claude Opus 4 via DIAL - Most capable Claude model",
        &["opus-4"],
    ),
    dial_model(
        "gemini-2.5-pro-preview-05-06",
        "DIAL (Gemini 2.5 Pro)",
        1_000_000,
        65_536,
        false,
        20.0,
        Some(TemperatureConstraint::range()),
        "Gemini 2.5 Pro via DIAL - Deep reasoning",
        &["gemini-2.5-pro"],
    ),
    dial_model(
        "gemini-2.5-flash-preview-05-20",
        "DIAL (Gemini Flash 2.5)",
        1_000_000,
        65_536,
        false,
        20.0,
        Some(TemperatureConstraint::range()),
        "Gemini 2.5 Flash via DIAL - Ultra-fast",
        &["gemini-2.5-flash"],
    ),
];

pub static DIAL: VendorSpec = VendorSpec {
    provider_type: ProviderType::DIAL,
    default_base_url: DIAL_DEFAULT_BASE_URL,
    auth: AuthStyle::Header("Api-Key"),
    deployment_api_version: Some(DIAL_DEFAULT_API_VERSION),
    models: &DIAL_MODELS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::openai_compatible::OpenAiCompatibleProvider;
    use crate::restrictions::AllowAll;
    use crate::traits::ModelProvider;
    use modelgate_core::{EndpointConfig, EndpointOverride, GenerationRequest};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_reasoning_deployments_have_no_temperature() {
        let catalog = DIAL.catalog();
        let o3 = catalog.get_capabilities("o3", &AllowAll).unwrap();
        assert_eq!(o3.model_name, "o3-2025-04-16");
        assert!(!o3.supports_temperature);

        let sonnet = catalog.get_capabilities("sonnet-4", &AllowAll).unwrap();
        assert!(sonnet.supports_temperature);
        assert!(!sonnet.supports_extended_thinking);
        assert!(catalog
            .get_capabilities("sonnet-4-thinking", &AllowAll)
            .unwrap()
            .supports_extended_thinking);
    }

    #[tokio::test]
    async fn test_deployment_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/openai/deployments/anthropic.claude-opus-4-20250514-v1:0/chat/completions",
            ))
            .and(query_param("api-version", "2025-01-01-preview"))
            .and(header("Api-Key", "dial-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "opus says hi" }, "finish_reason": "stop" }],
                "usage": { "prompt_tokens": 4, "completion_tokens": 3, "total_tokens": 7 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiCompatibleProvider::with_base_url(
            &DIAL,
            &mock_server.uri(),
            "dial-key",
            Arc::new(EndpointConfig::new("dial")),
            Arc::new(AllowAll),
        )
        .unwrap()
        .with_api_version("2025-01-01-preview");

        let resp = provider
            .generate_content(&GenerationRequest::new("hi", "opus-4"))
            .await
            .unwrap();
        assert_eq!(resp.content, "opus says hi");
        assert_eq!(resp.model_name, "anthropic.claude-opus-4-20250514-v1:0");
        assert_eq!(resp.friendly_name, "DIAL");
    }

    #[tokio::test]
    async fn test_transient_adapter_keeps_deployment_route() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/o3-2025-04-16/chat/completions"))
            .and(query_param("api-version", DIAL_DEFAULT_API_VERSION))
            .and(header("Api-Key", "team-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "routed" }, "finish_reason": "stop" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut endpoints = EndpointConfig::new("dial");
        endpoints.insert("o3", EndpointOverride::new(mock_server.uri(), "team-key"));
        let provider = OpenAiCompatibleProvider::new(
            &DIAL,
            "dial-key",
            None,
            Arc::new(endpoints),
            Arc::new(AllowAll),
        )
        .unwrap();
        assert_eq!(provider.base_url(), DIAL_DEFAULT_BASE_URL);

        let resp = provider
            .generate_content(&GenerationRequest::new("hi", "o3"))
            .await
            .unwrap();
        assert_eq!(resp.content, "routed");
        assert!(resp.usage.is_none());
    }
}
