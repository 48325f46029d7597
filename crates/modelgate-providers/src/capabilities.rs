//! Model capability descriptors and per-provider model catalogs.
//!
//! Each adapter owns a static table of [`ModelCapabilities`]. A
//! [`ModelCatalog`] wraps that table and handles alias resolution and the
//! supported/allowed checks.

use std::borrow::Cow;

use modelgate_core::ProviderType;
use serde::Serialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::restrictions::RestrictionPolicy;

// ─────────────────────────────────────────────
// Temperature constraint
// ─────────────────────────────────────────────

/// Temperatures a model accepts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemperatureConstraint {
    /// Only this exact value.
    Fixed { value: f64 },
    /// Anything in `min..=max`.
    Range { min: f64, max: f64, default: f64 },
}

impl TemperatureConstraint {
    /// Reasoning models: temperature pinned to 1.0.
    pub const fn fixed() -> Self {
        TemperatureConstraint::Fixed { value: 1.0 }
    }

    /// Regular chat models: 0.0 – 2.0, default 0.7.
    pub const fn range() -> Self {
        TemperatureConstraint::Range {
            min: 0.0,
            max: 2.0,
            default: 0.7,
        }
    }

    pub fn validate(&self, temperature: f64) -> bool {
        match *self {
            TemperatureConstraint::Fixed { value } => (temperature - value).abs() < 1e-6,
            TemperatureConstraint::Range { min, max, .. } => (min..=max).contains(&temperature),
        }
    }

    /// The closest acceptable value.
    pub fn corrected(&self, temperature: f64) -> f64 {
        match *self {
            TemperatureConstraint::Fixed { value } => value,
            TemperatureConstraint::Range { min, max, default } => {
                if temperature.is_nan() {
                    default
                } else {
                    temperature.clamp(min, max)
                }
            }
        }
    }

    pub fn default_value(&self) -> f64 {
        match *self {
            TemperatureConstraint::Fixed { value } => value,
            TemperatureConstraint::Range { default, .. } => default,
        }
    }
}

// ─────────────────────────────────────────────
// ModelCapabilities
// ─────────────────────────────────────────────

/// Static metadata describing one model's limits and features.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelCapabilities {
    pub provider: ProviderType,
    /// Canonical model name; the key in the provider's table.
    pub model_name: Cow<'static, str>,
    pub friendly_name: Cow<'static, str>,
    pub context_window: u32,
    pub max_output_tokens: u32,
    pub supports_extended_thinking: bool,
    pub supports_system_prompts: bool,
    pub supports_streaming: bool,
    pub supports_function_calling: bool,
    pub supports_json_mode: bool,
    pub supports_images: bool,
    /// `None` when images are unsupported.
    pub max_image_size_mb: Option<f32>,
    /// When false, the temperature parameter is left out of requests.
    pub supports_temperature: bool,
    pub temperature_constraint: TemperatureConstraint,
    pub description: Cow<'static, str>,
    pub aliases: &'static [&'static str],
}

impl ModelCapabilities {
    /// Conservative descriptor for a model we know nothing about
    /// (custom OpenAI-compatible endpoints).
    pub fn generic(provider: ProviderType, model_name: &str) -> Self {
        ModelCapabilities {
            provider,
            model_name: Cow::Owned(model_name.to_string()),
            friendly_name: Cow::Owned(format!("{} ({})", provider.display_name(), model_name)),
            context_window: 32_768,
            max_output_tokens: 32_768,
            supports_extended_thinking: false,
            supports_system_prompts: true,
            supports_streaming: true,
            supports_function_calling: false,
            supports_json_mode: false,
            supports_images: false,
            max_image_size_mb: None,
            supports_temperature: true,
            temperature_constraint: TemperatureConstraint::range(),
            description: Cow::Borrowed("Model served by a custom OpenAI-compatible endpoint"),
            aliases: &[],
        }
    }

    /// Temperature to send for this model, or `None` to omit it.
    pub fn effective_temperature(&self, requested: f64) -> Option<f64> {
        self.supports_temperature
            .then(|| self.temperature_constraint.corrected(requested))
    }
}

// ─────────────────────────────────────────────
// ModelCatalog
// ─────────────────────────────────────────────

/// A provider's static capability table plus lookup logic.
#[derive(Clone, Copy, Debug)]
pub struct ModelCatalog {
    provider: ProviderType,
    models: &'static [ModelCapabilities],
}

impl ModelCatalog {
    pub const fn new(provider: ProviderType, models: &'static [ModelCapabilities]) -> Self {
        Self { provider, models }
    }

    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    pub fn models(&self) -> &'static [ModelCapabilities] {
        self.models
    }

    /// Canonical names in table order.
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.model_name.to_string()).collect()
    }

    /// Look up a canonical name exactly.
    pub fn find(&self, canonical: &str) -> Option<&'static ModelCapabilities> {
        self.models.iter().find(|m| m.model_name == canonical)
    }

    /// Map an alias to its canonical name.
    ///
    /// Canonical names come back unchanged. Otherwise canonical names and
    /// aliases are compared case-insensitively; an unknown name is returned
    /// as-is and will be rejected by later lookups.
    pub fn resolve_model_name(&self, model_name: &str) -> String {
        if self.find(model_name).is_some() {
            return model_name.to_string();
        }

        let lower = model_name.to_lowercase();
        self.models
            .iter()
            .find(|m| {
                m.model_name.to_lowercase() == lower
                    || m.aliases.iter().any(|a| a.to_lowercase() == lower)
            })
            .map(|m| m.model_name.to_string())
            .unwrap_or_else(|| model_name.to_string())
    }

    /// Capabilities for a requested name, after alias resolution and the
    /// restriction check.
    pub fn get_capabilities(
        &self,
        model_name: &str,
        policy: &dyn RestrictionPolicy,
    ) -> Result<&'static ModelCapabilities, ProviderError> {
        let resolved = self.resolve_model_name(model_name);
        let caps = self
            .find(&resolved)
            .ok_or_else(|| ProviderError::UnsupportedModel {
                provider: self.provider,
                model: model_name.to_string(),
            })?;

        if !policy.is_allowed(self.provider, &resolved, model_name) {
            return Err(ProviderError::ModelNotAllowed {
                provider: self.provider,
                model: model_name.to_string(),
            });
        }

        Ok(caps)
    }

    /// Capabilities used to shape a vendor call.
    ///
    /// With `allow_unlisted` (the call targets a custom endpoint) a model
    /// missing from the table yields `Ok(None)` so the request goes out with
    /// generic settings. Policy rejections always fail.
    pub fn capabilities_for_call(
        &self,
        model_name: &str,
        policy: &dyn RestrictionPolicy,
        allow_unlisted: bool,
    ) -> Result<Option<&'static ModelCapabilities>, ProviderError> {
        match self.get_capabilities(model_name, policy) {
            Ok(caps) => Ok(Some(caps)),
            Err(ProviderError::UnsupportedModel { .. }) if allow_unlisted => {
                debug!(provider = %self.provider, model = model_name, "unlisted model on custom endpoint");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the name is supported and allowed.
    pub fn validate_model_name(&self, model_name: &str, policy: &dyn RestrictionPolicy) -> bool {
        let resolved = self.resolve_model_name(model_name);
        if self.find(&resolved).is_none() {
            return false;
        }
        if !policy.is_allowed(self.provider, &resolved, model_name) {
            debug!(
                provider = %self.provider,
                model = model_name,
                resolved = %resolved,
                "model blocked by restrictions"
            );
            return false;
        }
        true
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restrictions::AllowAll;

    static TEST_MODELS: [ModelCapabilities; 2] = [
        ModelCapabilities {
            provider: ProviderType::OpenAI,
            model_name: Cow::Borrowed("alpha-1"),
            friendly_name: Cow::Borrowed("Test (Alpha)"),
            context_window: 1000,
            max_output_tokens: 100,
            supports_extended_thinking: true,
            supports_system_prompts: true,
            supports_streaming: true,
            supports_function_calling: false,
            supports_json_mode: false,
            supports_images: false,
            max_image_size_mb: None,
            supports_temperature: false,
            temperature_constraint: TemperatureConstraint::fixed(),
            description: Cow::Borrowed("alpha"),
            aliases: &["alpha", "a1"],
        },
        ModelCapabilities {
            provider: ProviderType::OpenAI,
            model_name: Cow::Borrowed("beta-2"),
            friendly_name: Cow::Borrowed("Test (Beta)"),
            context_window: 2000,
            max_output_tokens: 200,
            supports_extended_thinking: false,
            supports_system_prompts: true,
            supports_streaming: true,
            supports_function_calling: true,
            supports_json_mode: true,
            supports_images: true,
            max_image_size_mb: Some(20.0),
            supports_temperature: true,
            temperature_constraint: TemperatureConstraint::range(),
            description: Cow::Borrowed("beta"),
            aliases: &["beta"],
        },
    ];

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(ProviderType::OpenAI, &TEST_MODELS)
    }

    struct DenyBeta;

    impl RestrictionPolicy for DenyBeta {
        fn is_allowed(&self, _provider: ProviderType, canonical: &str, _requested: &str) -> bool {
            canonical != "beta-2"
        }
    }

    #[test]
    fn test_resolve_canonical_and_alias() {
        assert_eq!(catalog().resolve_model_name("alpha-1"), "alpha-1");
        assert_eq!(catalog().resolve_model_name("a1"), "alpha-1");
        assert_eq!(catalog().resolve_model_name("ALPHA"), "alpha-1");
        assert_eq!(catalog().resolve_model_name("Beta-2"), "beta-2");
        assert_eq!(catalog().resolve_model_name("gamma"), "gamma");
    }

    #[test]
    fn test_alias_resolution_is_not_substring() {
        assert_eq!(catalog().resolve_model_name("alph"), "alph");
        assert_eq!(catalog().resolve_model_name("beta-2-large"), "beta-2-large");
    }

    #[test]
    fn test_get_capabilities_unsupported() {
        let err = catalog().get_capabilities("gamma", &AllowAll).unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedModel { .. }));
        assert!(!catalog().validate_model_name("gamma", &AllowAll));
    }

    #[test]
    fn test_restriction_rejects_known_model() {
        let err = catalog().get_capabilities("beta", &DenyBeta).unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotAllowed { .. }));
        assert!(!catalog().validate_model_name("beta", &DenyBeta));
        assert!(catalog().validate_model_name("alpha", &DenyBeta));
    }

    #[test]
    fn test_capabilities_for_call() {
        assert!(catalog()
            .capabilities_for_call("gamma", &AllowAll, true)
            .unwrap()
            .is_none());
        assert!(catalog().capabilities_for_call("gamma", &AllowAll, false).is_err());
        assert_eq!(
            catalog()
                .capabilities_for_call("a1", &AllowAll, false)
                .unwrap()
                .map(|c| c.model_name.as_ref()),
            Some("alpha-1")
        );
        // Blocked models stay blocked on custom endpoints
        let err = catalog()
            .capabilities_for_call("beta", &DenyBeta, true)
            .unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotAllowed { .. }));
    }

    #[test]
    fn test_temperature_constraints() {
        let fixed = TemperatureConstraint::fixed();
        assert!(fixed.validate(1.0));
        assert!(!fixed.validate(0.7));
        assert_eq!(fixed.corrected(0.2), 1.0);

        let range = TemperatureConstraint::range();
        assert!(range.validate(0.0));
        assert!(range.validate(2.0));
        assert!(!range.validate(2.5));
        assert_eq!(range.corrected(3.0), 2.0);
        assert_eq!(range.corrected(-1.0), 0.0);
        assert_eq!(range.corrected(f64::NAN), 0.7);
        assert_eq!(range.default_value(), 0.7);
    }

    #[test]
    fn test_effective_temperature() {
        assert_eq!(TEST_MODELS[0].effective_temperature(0.3), None);
        assert_eq!(TEST_MODELS[1].effective_temperature(0.3), Some(0.3));
    }

    #[test]
    fn test_generic_capabilities() {
        let caps = ModelCapabilities::generic(ProviderType::Custom, "llama3.2");
        assert_eq!(caps.model_name, "llama3.2");
        assert!(caps.aliases.is_empty());
        assert!(caps.supports_temperature);
    }
}
