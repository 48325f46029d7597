//! Settings schema — provider credentials and generation defaults.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::types::ProviderType;

// ─────────────────────────────────────────────
// Root settings
// ─────────────────────────────────────────────

/// Root settings, loaded from `~/.modelgate/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub providers: ProvidersConfig,
    pub defaults: GenerationDefaults,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials and base URL for one vendor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// API version query parameter (DIAL only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Per-vendor configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    pub xai: ProviderConfig,
    pub dial: ProviderConfig,
    /// Generic OpenAI-compatible endpoint (Ollama, vLLM, LM Studio, …).
    /// Configured by `api_base`; the key may be empty for local servers.
    pub custom: ProviderConfig,
}

impl ProvidersConfig {
    /// Get the config block for a provider type.
    pub fn get(&self, provider: ProviderType) -> Option<&ProviderConfig> {
        match provider {
            ProviderType::OpenAI => Some(&self.openai),
            ProviderType::Google => Some(&self.gemini),
            ProviderType::XAI => Some(&self.xai),
            ProviderType::DIAL => Some(&self.dial),
            ProviderType::Custom => Some(&self.custom),
            ProviderType::Unified => None,
        }
    }

    /// Whether the provider can be instantiated from these settings.
    pub fn is_enabled(&self, provider: ProviderType) -> bool {
        match provider {
            ProviderType::Custom => self
                .custom
                .api_base
                .as_deref()
                .is_some_and(|base| !base.is_empty()),
            other => self.get(other).is_some_and(ProviderConfig::is_configured),
        }
    }
}

// ─────────────────────────────────────────────
// Generation defaults
// ─────────────────────────────────────────────

/// Defaults applied when the caller leaves a parameter unset.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDefaults {
    /// Model used when none is given.
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Upper bound on generated tokens; `None` leaves it to the vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            model: "o4-mini".to_string(),
            temperature: 0.7,
            max_output_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_enabled_by_base_url() {
        let mut providers = ProvidersConfig::default();
        assert!(!providers.is_enabled(ProviderType::Custom));

        providers.custom.api_base = Some("http://localhost:11434/v1".into());
        assert!(providers.is_enabled(ProviderType::Custom));
        assert!(!providers.custom.is_configured());
    }

    #[test]
    fn test_vendor_enabled_by_key() {
        let mut providers = ProvidersConfig::default();
        providers.gemini.api_key = "g-key".into();
        assert!(providers.is_enabled(ProviderType::Google));
        assert!(!providers.is_enabled(ProviderType::OpenAI));
        assert!(!providers.is_enabled(ProviderType::Unified));
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json["defaults"].get("temperature").is_some());
        assert!(json["providers"]["openai"].get("apiKey").is_some());
        assert!(json["providers"]["openai"].get("api_key").is_none());
    }
}
