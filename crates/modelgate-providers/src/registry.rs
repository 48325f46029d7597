//! Provider registry: which adapter serves which model.
//!
//! An explicit object built once at startup and shared behind an `Arc`.
//! Lookup walks providers in a fixed precedence order (Google, OpenAI, X.AI,
//! DIAL, Custom), so a name claimed by two vendors (DIAL's `o3` alias and
//! OpenAI's canonical `o3`) goes to the earlier one.

use std::collections::BTreeMap;
use std::sync::Arc;

use modelgate_core::config::{ProviderConfig, Settings};
use modelgate_core::{EndpointConfig, ProviderType};
use tracing::{debug, info};

use crate::custom::CustomProvider;
use crate::dial::DIAL;
use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::openai::OPENAI;
use crate::openai_compatible::{OpenAiCompatibleProvider, VendorSpec};
use crate::restrictions::RestrictionPolicy;
use crate::traits::ModelProvider;
use crate::xai::XAI;

/// Spec for the OpenAI-compatible vendors.
pub fn vendor_spec(provider: ProviderType) -> Option<&'static VendorSpec> {
    match provider {
        ProviderType::OpenAI => Some(&OPENAI),
        ProviderType::XAI => Some(&XAI),
        ProviderType::DIAL => Some(&DIAL),
        _ => None,
    }
}

#[derive(Default)]
pub struct ProviderRegistry {
    // Ord on ProviderType is the lookup precedence.
    providers: BTreeMap<ProviderType, Arc<dyn ModelProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider the settings enable.
    ///
    /// Endpoint overrides for each vendor are read from the process
    /// environment. Custom is enabled by a base URL rather than a key.
    pub fn from_settings(
        settings: &Settings,
        policy: Arc<dyn RestrictionPolicy>,
    ) -> Result<Self, ProviderError> {
        let mut registry = Self::new();

        for provider in ProviderType::ALL {
            if !settings.providers.is_enabled(provider) {
                continue;
            }
            let Some(config) = settings.providers.get(provider) else {
                continue;
            };
            let endpoints = Arc::new(EndpointConfig::from_env(provider.as_str()));
            let adapter = build_adapter(provider, config, endpoints, Arc::clone(&policy))?;
            registry.register(adapter);
        }

        info!(count = registry.len(), "provider registry ready");
        Ok(registry)
    }

    /// Add an adapter, replacing any previous one of the same type.
    pub fn register(&mut self, provider: Arc<dyn ModelProvider>) {
        let provider_type = provider.provider_type();
        debug!(provider = %provider_type, base_url = provider.base_url(), "registered provider");
        self.providers.insert(provider_type, provider);
    }

    pub fn get_provider(&self, provider_type: ProviderType) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(&provider_type).cloned()
    }

    /// First provider, in precedence order, that accepts the model name.
    pub fn get_provider_for_model(&self, model_name: &str) -> Option<Arc<dyn ModelProvider>> {
        let found = self
            .providers
            .iter()
            .filter(|(provider_type, _)| **provider_type != ProviderType::Unified)
            .find(|(_, provider)| provider.validate_model_name(model_name))
            .map(|(_, provider)| Arc::clone(provider));

        match &found {
            Some(provider) => debug!(
                model = model_name,
                provider = %provider.provider_type(),
                "resolved provider for model"
            ),
            None => debug!(model = model_name, "no provider accepts model"),
        }
        found
    }

    /// Allowed canonical model names per registered provider.
    pub fn available_models(&self) -> BTreeMap<ProviderType, Vec<String>> {
        self.providers
            .iter()
            .map(|(provider_type, provider)| (*provider_type, provider.list_models()))
            .collect()
    }

    /// Registered providers in precedence order.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn ModelProvider>> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn build_adapter(
    provider: ProviderType,
    config: &ProviderConfig,
    endpoints: Arc<EndpointConfig>,
    policy: Arc<dyn RestrictionPolicy>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let api_base = config.api_base.as_deref().filter(|b| !b.is_empty());

    if let Some(spec) = vendor_spec(provider) {
        let mut adapter = match api_base {
            Some(base) => OpenAiCompatibleProvider::with_base_url(
                spec,
                base,
                &config.api_key,
                endpoints,
                policy,
            )?,
            None => OpenAiCompatibleProvider::new(spec, &config.api_key, None, endpoints, policy)?,
        };
        if let Some(version) = config.api_version.as_deref().filter(|v| !v.is_empty()) {
            if spec.deployment_api_version.is_some() {
                adapter = adapter.with_api_version(version);
            }
        }
        return Ok(Arc::new(adapter));
    }

    match provider {
        ProviderType::Google => {
            let adapter = match api_base {
                Some(base) => GeminiProvider::with_base_url(base, &config.api_key, endpoints, policy)?,
                None => GeminiProvider::new(&config.api_key, None, endpoints, policy)?,
            };
            Ok(Arc::new(adapter))
        }
        ProviderType::Custom => Ok(Arc::new(CustomProvider::new(
            api_base.unwrap_or_default(),
            &config.api_key,
        )?)),
        other => Err(ProviderError::MissingConfiguration(format!(
            "{} cannot be built from settings",
            other.display_name()
        ))),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
