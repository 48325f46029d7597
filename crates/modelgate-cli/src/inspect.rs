//! Read-only inspection commands: `endpoints`, `models`, `resolve`.

use anyhow::{bail, Result};
use colored::Colorize;

use modelgate_core::utils::truncate_string;
use modelgate_core::{EndpointConfig, ProviderType};
use modelgate_providers::{ModelProvider, ProviderRegistry, UnifiedProvider};

use crate::helpers::display_key;

/// Endpoint configs to show for the given flags.
pub fn endpoint_configs(namespace: Option<&str>, unified: bool) -> Result<Vec<EndpointConfig>> {
    if unified {
        return Ok(vec![EndpointConfig::unified_from_env()]);
    }
    match namespace {
        Some(ns) => match ProviderType::from_name(ns) {
            Some(provider) if provider != ProviderType::Unified => {
                Ok(vec![EndpointConfig::from_env(provider.as_str())])
            }
            _ => bail!(
                "unknown namespace '{ns}' (expected one of: google, openai, xai, dial, custom)"
            ),
        },
        None => Ok(ProviderType::ALL
            .iter()
            .filter(|p| **p != ProviderType::Unified)
            .map(|p| EndpointConfig::from_env(p.as_str()))
            .collect()),
    }
}

/// `modelgate endpoints`
pub fn endpoints(namespace: Option<&str>, unified: bool) -> Result<()> {
    let configs = endpoint_configs(namespace, unified)?;

    println!();
    for config in &configs {
        let title = config.namespace().unwrap_or("unified");
        println!("  {} {}", title.bold(), config.scope().config_var().dimmed());
        if config.is_empty() {
            println!("    {}", "· no overrides".dimmed());
        }
        for (model, endpoint) in config.iter() {
            println!(
                "    {:<28} {} {}",
                model,
                endpoint.base_url,
                display_key(&endpoint.api_key).dimmed()
            );
        }
    }
    println!();
    Ok(())
}

/// `modelgate models`
pub fn models(registry: &ProviderRegistry) -> Result<()> {
    println!();
    if registry.is_empty() {
        println!(
            "  {}",
            "No providers configured. Set an API key (e.g. OPENAI_API_KEY) or run `modelgate init`."
                .yellow()
        );
        println!();
        return Ok(());
    }

    for provider in registry.providers() {
        println!("  {}", provider.friendly_name().bold());
        let models = provider.list_models();
        if models.is_empty() {
            println!("    {}", "· accepts any model name".dimmed());
        }
        for name in models {
            let Ok(caps) = provider.get_capabilities(&name) else {
                continue;
            };
            let aliases = if caps.aliases.is_empty() {
                String::new()
            } else {
                format!("[{}]", caps.aliases.join(", "))
            };
            println!(
                "    {:<44} {:>9} ctx  {}",
                name,
                caps.context_window,
                aliases.dimmed()
            );
            if !caps.description.is_empty() {
                println!("      {}", truncate_string(&caps.description, 72).dimmed());
            }
        }
    }
    println!();
    Ok(())
}

/// `modelgate resolve <MODEL>`
pub fn resolve(registry: &ProviderRegistry, unified: &UnifiedProvider, model: &str) -> Result<()> {
    println!();
    println!("  {:<18} {}", "Model:".bold(), model);

    if let Some(endpoint) = unified.endpoints().get_endpoint_for_model(model) {
        println!(
            "  {:<18} {} (unified override)",
            "Unified route:".bold(),
            endpoint.base_url
        );
    }

    match registry.get_provider_for_model(model) {
        Some(provider) => {
            println!("  {:<18} {}", "Provider:".bold(), provider.friendly_name());
            println!("  {:<18} {}", "Base URL:".bold(), provider.base_url());
            match provider.get_capabilities(model) {
                Ok(caps) => {
                    println!("  {:<18} {}", "Canonical:".bold(), caps.model_name);
                    println!("  {:<18} {}", "Description:".bold(), caps.description);
                    println!(
                        "  {:<18} {} in / {} out",
                        "Tokens:".bold(),
                        caps.context_window,
                        caps.max_output_tokens
                    );
                    println!(
                        "  {:<18} {}",
                        "Temperature:".bold(),
                        if caps.supports_temperature {
                            format!("{:?}", caps.temperature_constraint)
                        } else {
                            "not sent".to_string()
                        }
                    );
                    println!(
                        "  {:<18} {}",
                        "Thinking mode:".bold(),
                        if caps.supports_extended_thinking { "yes" } else { "no" }
                    );
                }
                Err(e) => println!("  {:<18} {}", "Capabilities:".bold(), e.to_string().red()),
            }
        }
        None if unified.validate_model_name(model) => {}
        None => println!("  {}", "No configured provider serves this model.".red()),
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_configs_scopes() {
        let all = endpoint_configs(None, false).unwrap();
        let namespaces: Vec<_> = all.iter().filter_map(|c| c.namespace()).collect();
        assert_eq!(namespaces, vec!["google", "openai", "xai", "dial", "custom"]);

        let one = endpoint_configs(Some("OpenAI"), false).unwrap();
        assert_eq!(one[0].namespace(), Some("openai"));

        let unified = endpoint_configs(Some("openai"), true).unwrap();
        assert_eq!(unified[0].namespace(), None);

        assert!(endpoint_configs(Some("anthropic"), false).is_err());
    }
}
