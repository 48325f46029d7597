//! Model restriction policies — which models a deployment may use.
//!
//! Adapters ask the policy about every `(canonical, requested)` pair before
//! reporting capabilities or accepting a model name.

use std::collections::{HashMap, HashSet};

use modelgate_core::utils::process_env;
use modelgate_core::ProviderType;
use tracing::{debug, info};

/// Decides whether a model may be used.
pub trait RestrictionPolicy: Send + Sync {
    /// `canonical` is the resolved table key, `requested` the name the caller
    /// used (possibly an alias).
    fn is_allowed(&self, provider: ProviderType, canonical: &str, requested: &str) -> bool;
}

/// Permits every model.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl RestrictionPolicy for AllowAll {
    fn is_allowed(&self, _provider: ProviderType, _canonical: &str, _requested: &str) -> bool {
        true
    }
}

/// Allow-lists read from `<PROVIDER>_ALLOWED_MODELS` variables.
///
/// Each variable is a comma-separated list, compared case-insensitively.
/// Providers without a list (or with an empty one) are unrestricted. A model
/// passes when either its canonical or its requested name is listed.
#[derive(Clone, Debug, Default)]
pub struct EnvRestrictionPolicy {
    allowed: HashMap<ProviderType, HashSet<String>>,
}

const RESTRICTED_PROVIDERS: [(ProviderType, &str); 4] = [
    (ProviderType::OpenAI, "OPENAI_ALLOWED_MODELS"),
    (ProviderType::Google, "GOOGLE_ALLOWED_MODELS"),
    (ProviderType::XAI, "XAI_ALLOWED_MODELS"),
    (ProviderType::DIAL, "DIAL_ALLOWED_MODELS"),
];

impl EnvRestrictionPolicy {
    pub fn from_env() -> Self {
        Self::from_vars(process_env())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let mut allowed = HashMap::new();

        for (provider, var) in RESTRICTED_PROVIDERS {
            let Some(raw) = vars.get(var) else { continue };
            let models: HashSet<String> = raw
                .split(',')
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect();
            if models.is_empty() {
                continue;
            }
            info!(provider = %provider, count = models.len(), "model restrictions active");
            allowed.insert(provider, models);
        }

        Self { allowed }
    }

    /// Allowed names for a provider, or `None` if it is unrestricted.
    pub fn allowed_models(&self, provider: ProviderType) -> Option<&HashSet<String>> {
        self.allowed.get(&provider)
    }
}

impl RestrictionPolicy for EnvRestrictionPolicy {
    fn is_allowed(&self, provider: ProviderType, canonical: &str, requested: &str) -> bool {
        let Some(models) = self.allowed.get(&provider) else {
            return true;
        };
        let permitted = models.contains(&canonical.to_lowercase())
            || models.contains(&requested.to_lowercase());
        if !permitted {
            debug!(provider = %provider, canonical, requested, "model not in allow-list");
        }
        permitted
    }
}
