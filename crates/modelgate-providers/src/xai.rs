//! X.AI (GROK) models.

use std::borrow::Cow;

use modelgate_core::ProviderType;

use crate::capabilities::{ModelCapabilities, TemperatureConstraint};
use crate::http_client::AuthStyle;
use crate::openai_compatible::VendorSpec;

pub const XAI_DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

pub static XAI_MODELS: [ModelCapabilities; 2] = [
    ModelCapabilities {
        provider: ProviderType::XAI,
        model_name: Cow::Borrowed("grok-3"),
        friendly_name: Cow::Borrowed("X.AI (Grok 3)"),
        context_window: 131_072,
        max_output_tokens: 131_072,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: false,
        supports_images: false,
        max_image_size_mb: None,
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "GROK-3 (131K context) - Advanced reasoning model from X.AI, excellent for complex analysis",
        ),
        aliases: &["grok", "grok3"],
    },
    ModelCapabilities {
        provider: ProviderType::XAI,
        model_name: Cow::Borrowed("grok-3-fast"),
        friendly_name: Cow::Borrowed("X.AI (Grok 3 Fast)"),
        context_window: 131_072,
        max_output_tokens: 131_072,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: false,
        supports_images: false,
        max_image_size_mb: None,
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "GROK-3 Fast (131K context) - Higher performance variant, faster processing but more expensive",
        ),
        aliases: &["grok3fast", "grokfast", "grok3-fast"],
    },
];

pub static XAI: VendorSpec = VendorSpec {
    provider_type: ProviderType::XAI,
    default_base_url: XAI_DEFAULT_BASE_URL,
    auth: AuthStyle::Bearer,
    deployment_api_version: None,
    models: &XAI_MODELS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::openai_compatible::OpenAiCompatibleProvider;
    use crate::restrictions::AllowAll;
    use crate::traits::ModelProvider;
    use modelgate_core::EndpointConfig;

    #[test]
    fn test_grok_aliases() {
        let catalog = XAI.catalog();
        assert_eq!(catalog.resolve_model_name("grok"), "grok-3");
        assert_eq!(catalog.resolve_model_name("GrokFast"), "grok-3-fast");
        assert!(catalog.validate_model_name("grok3-fast", &AllowAll));
        assert!(!catalog.validate_model_name("grok-4", &AllowAll));
    }

    #[test]
    fn test_default_base_url() {
        let provider = OpenAiCompatibleProvider::new(
            &XAI,
            "xai-key",
            None,
            Arc::new(EndpointConfig::new("xai")),
            Arc::new(AllowAll),
        )
        .unwrap();
        assert_eq!(provider.base_url(), XAI_DEFAULT_BASE_URL);
        assert_eq!(provider.friendly_name(), "X.AI");
        assert!(!provider.supports_thinking_mode("grok"));
    }
}
