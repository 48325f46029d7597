//! Unified routing adapter.
//!
//! One [`ModelProvider`] that serves any model: names with an entry in the
//! unified endpoint map go to a [`CustomProvider`] bound to that endpoint,
//! everything else is delegated to the [`ProviderRegistry`]. The adapter
//! picked for a model name is cached for the lifetime of this instance.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use modelgate_core::utils::process_env;
use modelgate_core::{EndpointConfig, GenerationRequest, ModelResponse, ProviderType};
use tracing::{debug, info};

use crate::capabilities::ModelCapabilities;
use crate::custom::CustomProvider;
use crate::error::ProviderError;
use crate::registry::ProviderRegistry;
use crate::traits::{estimate_tokens, ModelProvider};

pub struct UnifiedProvider {
    registry: Arc<ProviderRegistry>,
    endpoints: EndpointConfig,
    api_key: String,
    cache: Mutex<HashMap<String, Arc<dyn ModelProvider>>>,
}

impl std::fmt::Debug for UnifiedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedProvider")
            .field("registry", &self.registry)
            .field("endpoints", &self.endpoints.len())
            .finish()
    }
}

/// Fallback key for overrides that carry none.
const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

impl UnifiedProvider {
    pub const FRIENDLY_NAME: &'static str = "Unified OpenAI";

    /// `api_key` is used for endpoint overrides that carry no key of their own.
    pub fn new(registry: Arc<ProviderRegistry>, endpoints: EndpointConfig, api_key: &str) -> Self {
        info!(endpoints = endpoints.len(), "unified provider ready");
        Self {
            registry,
            endpoints,
            api_key: api_key.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build with the endpoint map from `*_ENDPOINT` variables and
    /// `UNIFIED_ENDPOINTS_CONFIG`. Keyless overrides fall back to
    /// `OPENAI_API_KEY`.
    pub fn from_env(registry: Arc<ProviderRegistry>) -> Self {
        Self::from_vars(registry, process_env())
    }

    /// Same as [`UnifiedProvider::from_env`] over an explicit variable list.
    pub fn from_vars<I, K, V>(registry: Arc<ProviderRegistry>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let api_key = vars
            .iter()
            .find(|(k, _)| k == OPENAI_KEY_VAR)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        Self::new(registry, EndpointConfig::unified_from_vars(vars), &api_key)
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// The adapter cached for a model name, if one was resolved already.
    pub fn cached_provider(&self, model_name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(model_name)
            .cloned()
    }

    /// Find (or build and cache) the adapter for a model name.
    fn resolve(&self, model_name: &str) -> Result<Option<Arc<dyn ModelProvider>>, ProviderError> {
        if let Some(provider) = self.cached_provider(model_name) {
            return Ok(Some(provider));
        }

        let provider: Arc<dyn ModelProvider> =
            if let Some(endpoint) = self.endpoints.get_endpoint_for_model(model_name) {
                info!(model = model_name, base_url = %endpoint.base_url, "routing to custom endpoint");
                Arc::new(CustomProvider::new(
                    &endpoint.base_url,
                    endpoint.api_key_or(&self.api_key),
                )?)
            } else if let Some(provider) = self.registry.get_provider_for_model(model_name) {
                debug!(model = model_name, provider = %provider.provider_type(), "routing via registry");
                provider
            } else {
                return Ok(None);
            };

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let entry = cache.entry(model_name.to_string()).or_insert(provider);
        Ok(Some(Arc::clone(entry)))
    }

    fn require(&self, model_name: &str) -> Result<Arc<dyn ModelProvider>, ProviderError> {
        self.resolve(model_name)?
            .ok_or_else(|| ProviderError::NoProviderFound(model_name.to_string()))
    }
}

#[async_trait]
impl ModelProvider for UnifiedProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Unified
    }

    fn friendly_name(&self) -> &str {
        Self::FRIENDLY_NAME
    }

    /// Empty: each model has its own destination.
    fn base_url(&self) -> &str {
        ""
    }

    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, ProviderError> {
        self.require(model_name)?.get_capabilities(model_name)
    }

    fn validate_model_name(&self, model_name: &str) -> bool {
        self.endpoints.has_custom_endpoint(model_name)
            || self.registry.get_provider_for_model(model_name).is_some()
    }

    fn supports_thinking_mode(&self, model_name: &str) -> bool {
        match self.resolve(model_name) {
            Ok(Some(provider)) => provider.supports_thinking_mode(model_name),
            _ => false,
        }
    }

    /// Override keys first, then every registry model.
    fn list_models(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.endpoints
            .iter()
            .map(|(model, _)| model.to_string())
            .chain(self.registry.available_models().into_values().flatten())
            .filter(|model| seen.insert(model.clone()))
            .collect()
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ModelResponse, ProviderError> {
        let provider = self.require(&request.model_name)?;
        let mut response = provider.generate_content(request).await?;
        response.friendly_name = Self::FRIENDLY_NAME.to_string();
        Ok(response)
    }

    async fn count_tokens(&self, text: &str, model_name: &str) -> Result<u32, ProviderError> {
        match self.resolve(model_name) {
            Ok(Some(provider)) => provider.count_tokens(text, model_name).await,
            _ => {
                debug!(model = model_name, "no delegate, estimating tokens");
                Ok(estimate_tokens(text))
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
