//! `modelgate status` — show settings, provider keys, restrictions, and
//! endpoint overrides.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use modelgate_core::config::{get_config_path, load_settings};
use modelgate_core::{EndpointConfig, ProviderType};
use modelgate_providers::EnvRestrictionPolicy;

use crate::helpers::key_status;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let settings = load_settings(config_path);
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Modelgate Status".cyan().bold());
    println!();

    // Settings file
    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Defaults
    println!("  {:<18} {}", "Default model:".bold(), settings.defaults.model);
    println!(
        "  {:<18} {} | max_output_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", settings.defaults.temperature).dimmed(),
        settings
            .defaults
            .max_output_tokens
            .map_or_else(|| "vendor default".to_string(), |n| n.to_string())
            .dimmed(),
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    let policy = EnvRestrictionPolicy::from_env();

    for provider in ProviderType::ALL {
        let Some(config) = settings.providers.get(provider) else {
            continue;
        };
        let status = match provider {
            ProviderType::Custom => match config.api_base.as_deref().filter(|b| !b.is_empty()) {
                Some(base) => format!("{} {}", "✓".green(), base),
                None => format!("{}", "· not configured".dimmed()),
            },
            _ => key_status(&config.api_key),
        };
        println!("    {:<20} {}", provider.display_name(), status);

        if let Some(allowed) = policy.allowed_models(provider) {
            let mut allowed: Vec<&str> = allowed.iter().map(String::as_str).collect();
            allowed.sort_unstable();
            println!("    {:<20} {}", "", format!("allowed: {}", allowed.join(", ")).yellow());
        }

        let overrides = EndpointConfig::from_env(provider.as_str());
        if !overrides.is_empty() {
            println!(
                "    {:<20} {}",
                "",
                format!("{} endpoint override(s)", overrides.len()).dimmed()
            );
        }
    }

    // Unified routing
    println!();
    let unified = EndpointConfig::unified_from_env();
    println!(
        "  {:<18} {}",
        "Unified routes:".bold(),
        if unified.is_empty() {
            format!("{}", "· none".dimmed())
        } else {
            format!("{} model(s)", unified.len())
        }
    );

    println!();

    Ok(())
}
