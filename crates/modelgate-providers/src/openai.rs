//! OpenAI models.

use std::borrow::Cow;

use modelgate_core::ProviderType;

use crate::capabilities::{ModelCapabilities, TemperatureConstraint};
use crate::http_client::AuthStyle;
use crate::openai_compatible::VendorSpec;

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub static OPENAI_MODELS: [ModelCapabilities; 5] = [
    ModelCapabilities {
        provider: ProviderType::OpenAI,
        model_name: Cow::Borrowed("o3"),
        friendly_name: Cow::Borrowed("OpenAI (O3)"),
        context_window: 200_000,
        max_output_tokens: 65_536,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: false,
        temperature_constraint: TemperatureConstraint::fixed(),
        description: Cow::Borrowed(
            "Strong reasoning (200K context) - Logical problems, code generation, systematic analysis",
        ),
        aliases: &[],
    },
    ModelCapabilities {
        provider: ProviderType::OpenAI,
        model_name: Cow::Borrowed("o3-mini"),
        friendly_name: Cow::Borrowed("OpenAI (O3-mini)"),
        context_window: 200_000,
        max_output_tokens: 65_536,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: false,
        temperature_constraint: TemperatureConstraint::fixed(),
        description: Cow::Borrowed(
            "Fast O3 variant (200K context) - Balanced performance/speed, moderate complexity",
        ),
        aliases: &["o3mini", "o3-mini"],
    },
    ModelCapabilities {
        provider: ProviderType::OpenAI,
        model_name: Cow::Borrowed("o3-pro-2025-06-10"),
        friendly_name: Cow::Borrowed("OpenAI (O3-Pro)"),
        context_window: 200_000,
        max_output_tokens: 65_536,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: false,
        temperature_constraint: TemperatureConstraint::fixed(),
        description: Cow::Borrowed(
            "Professional-grade reasoning (200K context) - EXTREMELY EXPENSIVE: only for the most complex problems",
        ),
        aliases: &["o3-pro"],
    },
    ModelCapabilities {
        provider: ProviderType::OpenAI,
        model_name: Cow::Borrowed("o4-mini"),
        friendly_name: Cow::Borrowed("OpenAI (O4-mini)"),
        context_window: 200_000,
        max_output_tokens: 65_536,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: false,
        temperature_constraint: TemperatureConstraint::fixed(),
        description: Cow::Borrowed(
            "Latest reasoning model (200K context) - Optimized for shorter contexts, rapid reasoning",
        ),
        aliases: &["mini", "o4mini", "o4-mini"],
    },
    ModelCapabilities {
        provider: ProviderType::OpenAI,
        model_name: Cow::Borrowed("gpt-4.1-2025-04-14"),
        friendly_name: Cow::Borrowed("OpenAI (GPT 4.1)"),
        context_window: 1_000_000,
        max_output_tokens: 32_768,
        supports_extended_thinking: false,
        supports_system_prompts: true,
        supports_streaming: true,
        supports_function_calling: true,
        supports_json_mode: true,
        supports_images: true,
        max_image_size_mb: Some(20.0),
        supports_temperature: true,
        temperature_constraint: TemperatureConstraint::range(),
        description: Cow::Borrowed(
            "GPT-4.1 (1M context) - Advanced reasoning model with large context window",
        ),
        aliases: &["gpt4.1"],
    },
];

pub static OPENAI: VendorSpec = VendorSpec {
    provider_type: ProviderType::OpenAI,
    default_base_url: OPENAI_DEFAULT_BASE_URL,
    auth: AuthStyle::Bearer,
    deployment_api_version: None,
    models: &OPENAI_MODELS,
};
