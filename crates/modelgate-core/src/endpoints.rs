//! Custom endpoint overrides — redirect a named model to another base URL.
//!
//! Overrides come from two sources, merged in this order:
//!
//! 1. Environment variables `<NAMESPACE>_<MODEL>_ENDPOINT` and
//!    `<NAMESPACE>_<MODEL>_API_KEY` (e.g. `OPENAI_O3_ENDPOINT`).
//! 2. A JSON file named by `<NAMESPACE>_ENDPOINTS_CONFIG`, holding a
//!    `<namespace>_endpoints` object. File entries win over env entries.
//!
//! The unified scope scans every `*_ENDPOINT` variable regardless of prefix
//! and reads the `model_endpoints` object from `UNIFIED_ENDPOINTS_CONFIG`.
//!
//! A broken or unreadable config file is logged and otherwise ignored.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils::process_env;

const ENDPOINT_SUFFIX: &str = "_ENDPOINT";
const API_KEY_SUFFIX: &str = "_API_KEY";

/// Env var naming the unified adapter's JSON config file.
pub const UNIFIED_CONFIG_VAR: &str = "UNIFIED_ENDPOINTS_CONFIG";

// ─────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────

/// A substitute base URL / API key pair for one model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverride {
    pub base_url: String,
    /// Empty means "reuse the caller-supplied key".
    #[serde(default)]
    pub api_key: String,
}

impl EndpointOverride {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// The override key if set, otherwise `fallback`.
    pub fn api_key_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.api_key.is_empty() {
            fallback
        } else {
            &self.api_key
        }
    }
}

/// Which variables and file section an [`EndpointConfig`] was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointScope {
    /// One provider namespace, e.g. `"openai"` or `"google"`.
    Provider(String),
    /// Every `*_ENDPOINT` variable, for the unified routing adapter.
    Unified,
}

impl EndpointScope {
    /// Env var holding the path of the JSON config file.
    pub fn config_var(&self) -> String {
        match self {
            EndpointScope::Provider(ns) => format!("{}_ENDPOINTS_CONFIG", ns.to_uppercase()),
            EndpointScope::Unified => UNIFIED_CONFIG_VAR.to_string(),
        }
    }

    /// Top-level key of the JSON object holding the overrides.
    pub fn file_section(&self) -> String {
        match self {
            EndpointScope::Provider(ns) => format!("{ns}_endpoints"),
            EndpointScope::Unified => "model_endpoints".to_string(),
        }
    }

    fn label(&self) -> &str {
        match self {
            EndpointScope::Provider(ns) => ns,
            EndpointScope::Unified => "unified",
        }
    }
}

// ─────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────

/// Canonical lookup key for a model name.
///
/// Lowercases, turns `_` into `-`, and drops anything that is not
/// alphanumeric or `-`. Idempotent.
pub fn normalize_model_name(model_name: &str) -> String {
    model_name
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

fn strip_dashes(s: &str) -> String {
    s.chars().filter(|c| *c != '-').collect()
}

// ─────────────────────────────────────────────
// EndpointConfig
// ─────────────────────────────────────────────

/// Normalized model name → endpoint override, for one scope.
///
/// Built once, then read-only.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    scope: EndpointScope,
    // Sorted so fallback matches are deterministic.
    endpoints: BTreeMap<String, EndpointOverride>,
}

impl EndpointConfig {
    /// An empty config for a provider namespace.
    pub fn new(namespace: &str) -> Self {
        Self {
            scope: EndpointScope::Provider(namespace.to_lowercase()),
            endpoints: BTreeMap::new(),
        }
    }

    /// An empty config for the unified scope.
    pub fn unified() -> Self {
        Self {
            scope: EndpointScope::Unified,
            endpoints: BTreeMap::new(),
        }
    }

    /// Load overrides for `namespace` from the process environment.
    pub fn from_env(namespace: &str) -> Self {
        Self::from_vars(namespace, process_env())
    }

    /// Load overrides for `namespace` from an explicit variable list.
    pub fn from_vars<I, K, V>(namespace: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = Self::new(namespace);
        let vars = collect_vars(vars);
        let prefix = format!("{}_", namespace.to_uppercase());

        for (key, value) in &vars {
            let Some(model_part) = key
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(ENDPOINT_SUFFIX))
            else {
                continue;
            };
            let api_key = vars
                .get(&format!("{prefix}{model_part}{API_KEY_SUFFIX}"))
                .cloned()
                .unwrap_or_default();
            config.insert_logged(model_part, EndpointOverride::new(value.clone(), api_key));
        }

        config.merge_config_file(&vars);
        config
    }

    /// Load the unified endpoint map from the process environment.
    pub fn unified_from_env() -> Self {
        Self::unified_from_vars(process_env())
    }

    /// Load the unified endpoint map from an explicit variable list.
    ///
    /// Every `<PREFIX>_ENDPOINT` variable becomes an override for
    /// `normalize(<PREFIX>)`, paired with `<PREFIX>_API_KEY`.
    pub fn unified_from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = Self::unified();
        let vars = collect_vars(vars);

        for (key, value) in &vars {
            let Some(model_part) = key.strip_suffix(ENDPOINT_SUFFIX) else {
                continue;
            };
            let api_key = vars
                .get(&format!("{model_part}{API_KEY_SUFFIX}"))
                .cloned()
                .unwrap_or_default();
            config.insert_logged(model_part, EndpointOverride::new(value.clone(), api_key));
        }

        config.merge_config_file(&vars);
        config
    }

    /// Add or replace an override. The model name is normalized first;
    /// names that normalize to nothing are ignored.
    pub fn insert(&mut self, model_name: &str, endpoint: EndpointOverride) {
        let key = normalize_model_name(model_name);
        if key.is_empty() {
            debug!(scope = self.scope.label(), model = model_name, "ignoring empty model name");
            return;
        }
        self.endpoints.insert(key, endpoint);
    }

    fn insert_logged(&mut self, raw_model: &str, endpoint: EndpointOverride) {
        let key = normalize_model_name(raw_model);
        if key.is_empty() {
            return;
        }
        debug!(scope = self.scope.label(), raw = raw_model, model = %key, "extracted model name");
        info!(
            scope = self.scope.label(),
            model = %key,
            "loaded custom endpoint"
        );
        self.endpoints.insert(key, endpoint);
    }

    /// Merge entries from the JSON file named by the scope's config variable.
    fn merge_config_file(&mut self, vars: &HashMap<String, String>) {
        let var = self.scope.config_var();
        let Some(path) = vars.get(&var).filter(|p| !p.is_empty()) else {
            return;
        };
        let path = Path::new(path);
        let Some(entries) = load_file_entries(path, &self.scope.file_section()) else {
            return;
        };
        info!(
            scope = self.scope.label(),
            count = entries.len(),
            path = %path.display(),
            "loaded custom endpoints from config file"
        );
        for (model, endpoint) in entries {
            self.insert(&model, endpoint);
        }
    }

    /// Find the override for a model name.
    ///
    /// Tries, in order: exact normalized key, case-insensitive key, and a
    /// match that ignores `-` entirely (`"gemini-2.5-pro"` finds
    /// `"gemini25pro"`). The last step can conflate names that differ only by
    /// separators, such as `"o-3"` and `"o3"`.
    pub fn get_endpoint_for_model(&self, model_name: &str) -> Option<&EndpointOverride> {
        let normalized = normalize_model_name(model_name);
        if normalized.is_empty() {
            return None;
        }

        if let Some(endpoint) = self.endpoints.get(&normalized) {
            return Some(endpoint);
        }

        let lower = normalized.to_lowercase();
        if let Some((_, endpoint)) = self
            .endpoints
            .iter()
            .find(|(configured, _)| configured.to_lowercase() == lower)
        {
            return Some(endpoint);
        }

        let compact = strip_dashes(&lower);
        self.endpoints
            .iter()
            .find(|(configured, _)| strip_dashes(&configured.to_lowercase()) == compact)
            .map(|(_, endpoint)| endpoint)
    }

    /// Whether a custom endpoint is configured for this model.
    pub fn has_custom_endpoint(&self, model_name: &str) -> bool {
        let found = self.get_endpoint_for_model(model_name).is_some();
        if found {
            debug!(scope = self.scope.label(), model = model_name, "found custom endpoint");
        }
        found
    }

    pub fn scope(&self) -> &EndpointScope {
        &self.scope
    }

    /// Provider namespace, or `None` for the unified scope.
    pub fn namespace(&self) -> Option<&str> {
        match &self.scope {
            EndpointScope::Provider(ns) => Some(ns),
            EndpointScope::Unified => None,
        }
    }

    /// Iterate overrides in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointOverride)> {
        self.endpoints.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn collect_vars<I, K, V>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Read the `section` object of a JSON endpoints file.
///
/// Failures are logged and yield `None`. A file without the section loads
/// as empty.
fn load_file_entries(path: &Path, section: &str) -> Option<Vec<(String, EndpointOverride)>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read endpoints config {}: {}", path.display(), e);
            return None;
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse endpoints config {}: {}", path.display(), e);
            return None;
        }
    };

    let Some(section_value) = raw.get_mut(section).map(serde_json::Value::take) else {
        debug!(path = %path.display(), section, "endpoints config has no matching section");
        return Some(Vec::new());
    };

    match serde_json::from_value::<BTreeMap<String, EndpointOverride>>(section_value) {
        Ok(entries) => Some(entries.into_iter().collect()),
        Err(e) => {
            warn!(
                "Invalid '{}' section in endpoints config {}: {}",
                section,
                path.display(),
                e
            );
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
