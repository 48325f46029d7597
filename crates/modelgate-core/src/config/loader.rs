//! Settings loader — reads `~/.modelgate/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Settings::default()`)
//! 2. JSON file at `~/.modelgate/config.json`
//! 3. Environment variables (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{ProviderConfig, Settings};

/// Default settings file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load settings from the given path (or the default one) + env vars.
///
/// Falls back to `Settings::default()` if the file doesn't exist or can't be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_settings_from_path(&config_path))
}

/// Load settings from a specific file path, without env overrides.
fn load_settings_from_path(path: &Path) -> Settings {
    if !path.exists() {
        info!("No settings file found at {}, using defaults", path.display());
        return Settings::default();
    }

    debug!("Loading settings from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read settings file {}: {}", path.display(), e);
            return Settings::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to parse settings JSON: {}", e);
            Settings::default()
        }
    }
}

/// Save settings to disk (pretty-printed JSON with camelCase keys).
pub fn save_settings(settings: &Settings, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Settings saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of loaded settings.
///
/// Supported overrides:
/// - `OPENAI_API_KEY`, `XAI_API_KEY`, `DIAL_API_KEY`
/// - `GEMINI_API_KEY` (falls back to `GOOGLE_API_KEY`)
/// - `DIAL_API_HOST`, `DIAL_API_VERSION`
/// - `CUSTOM_API_URL`, `CUSTOM_API_KEY`
/// - `MODELGATE_DEFAULT_MODEL`, `MODELGATE_TEMPERATURE`, `MODELGATE_MAX_OUTPUT_TOKENS`
fn apply_env_overrides(mut settings: Settings) -> Settings {
    let providers = &mut settings.providers;

    apply_key_env(&mut providers.openai, &["OPENAI_API_KEY"]);
    apply_key_env(&mut providers.gemini, &["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    apply_key_env(&mut providers.xai, &["XAI_API_KEY"]);
    apply_key_env(&mut providers.dial, &["DIAL_API_KEY"]);
    apply_key_env(&mut providers.custom, &["CUSTOM_API_KEY"]);

    if let Some(val) = non_empty_env("DIAL_API_HOST") {
        providers.dial.api_base = Some(val);
    }
    if let Some(val) = non_empty_env("DIAL_API_VERSION") {
        providers.dial.api_version = Some(val);
    }
    if let Some(val) = non_empty_env("CUSTOM_API_URL") {
        providers.custom.api_base = Some(val);
    }

    let defaults = &mut settings.defaults;
    if let Some(val) = non_empty_env("MODELGATE_DEFAULT_MODEL") {
        defaults.model = val;
    }
    if let Some(val) = non_empty_env("MODELGATE_TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => defaults.temperature = t,
            Err(_) => warn!("Ignoring invalid MODELGATE_TEMPERATURE: {}", val),
        }
    }
    if let Some(val) = non_empty_env("MODELGATE_MAX_OUTPUT_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => defaults.max_output_tokens = Some(n),
            Err(_) => warn!("Ignoring invalid MODELGATE_MAX_OUTPUT_TOKENS: {}", val),
        }
    }

    settings
}

/// Set the API key from the first non-empty variable in `names`.
fn apply_key_env(provider: &mut ProviderConfig, names: &[&str]) {
    if let Some(val) = names.iter().find_map(|name| non_empty_env(name)) {
        provider.api_key = val;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
