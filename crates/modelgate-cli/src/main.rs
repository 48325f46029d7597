//! Modelgate CLI — entry point.
//!
//! # Commands
//!
//! - `modelgate init` — write default settings and an endpoint template
//! - `modelgate status` — show settings, keys, restrictions, overrides
//! - `modelgate endpoints [--namespace NS | --unified]` — list endpoint overrides
//! - `modelgate models` — list models of configured providers
//! - `modelgate resolve MODEL` — show which provider and capabilities a name maps to
//! - `modelgate generate [-m MODEL] PROMPT` — send one prompt
//! - `modelgate tokens [-m MODEL] TEXT` — count tokens

mod generate;
mod helpers;
mod init;
mod inspect;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use modelgate_core::config::{load_settings, Settings};
use modelgate_core::GenerationRequest;
use modelgate_providers::{EnvRestrictionPolicy, ProviderRegistry, UnifiedProvider};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Modelgate: one interface to OpenAI, Gemini, X.AI, DIAL and custom endpoints
#[derive(Parser)]
#[command(name = "modelgate", version, about, long_about = None)]
struct Cli {
    /// Settings file (default: ~/.modelgate/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings and an endpoint override template
    Init,

    /// Show settings, provider keys, restrictions and overrides
    Status,

    /// List custom endpoint overrides
    Endpoints {
        /// Provider namespace (google, openai, xai, dial, custom)
        #[arg(short, long, conflicts_with = "unified")]
        namespace: Option<String>,

        /// Show the unified endpoint map instead
        #[arg(long, default_value_t = false)]
        unified: bool,
    },

    /// List models served by configured providers
    Models,

    /// Show which provider serves a model name
    Resolve {
        /// Model name or alias
        model: String,
    },

    /// Generate a completion for one prompt
    Generate {
        /// Model name or alias (default from settings)
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Upper bound on generated tokens
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Route through the unified endpoint map
        #[arg(long, default_value_t = false)]
        unified: bool,

        /// The prompt
        prompt: String,
    },

    /// Count tokens in a text
    Tokens {
        /// Model name or alias (default from settings)
        #[arg(short, long)]
        model: Option<String>,

        /// The text
        text: String,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);
    let config_path = config_path.as_deref();

    match cli.command {
        Commands::Init => init::run(config_path),
        Commands::Status => status::run(config_path),
        Commands::Endpoints { namespace, unified } => {
            inspect::endpoints(namespace.as_deref(), unified)
        }
        Commands::Models => {
            let settings = load_settings(config_path);
            let registry = build_registry(&settings)?;
            inspect::models(&registry)
        }
        Commands::Resolve { model } => {
            let settings = load_settings(config_path);
            let registry = build_registry(&settings)?;
            let unified = UnifiedProvider::from_env(Arc::clone(&registry));
            inspect::resolve(&registry, &unified, &model)
        }
        Commands::Generate {
            model,
            system,
            temperature,
            max_tokens,
            unified,
            prompt,
        } => {
            let settings = load_settings(config_path);
            let request = build_request(&settings, prompt, model, system, temperature, max_tokens);
            generate::run(build_registry(&settings)?, request, unified).await
        }
        Commands::Tokens { model, text } => {
            let settings = load_settings(config_path);
            let model = model.unwrap_or_else(|| settings.defaults.model.clone());
            generate::tokens(build_registry(&settings)?, &model, &text).await
        }
    }
}

/// Build the provider registry from settings and `*_ALLOWED_MODELS`.
fn build_registry(settings: &Settings) -> Result<Arc<ProviderRegistry>> {
    let policy = Arc::new(EnvRestrictionPolicy::from_env());
    let registry =
        ProviderRegistry::from_settings(settings, policy).context("failed to build providers")?;
    Ok(Arc::new(registry))
}

/// Fill unset request parameters from the settings defaults.
fn build_request(
    settings: &Settings,
    prompt: String,
    model: Option<String>,
    system: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
) -> GenerationRequest {
    let defaults = &settings.defaults;
    let model = model.unwrap_or_else(|| defaults.model.clone());
    let mut request = GenerationRequest::new(prompt, model)
        .with_temperature(temperature.unwrap_or(defaults.temperature));

    if let Some(system) = system {
        request = request.with_system_prompt(system);
    }
    if let Some(max) = max_tokens.or(defaults.max_output_tokens) {
        request = request.with_max_output_tokens(max);
    }
    request
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("modelgate=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "modelgate", "generate", "-m", "pro", "-t", "0.2", "--unified", "hello",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                model,
                temperature,
                unified,
                prompt,
                ..
            } => {
                assert_eq!(model.as_deref(), Some("pro"));
                assert_eq!(temperature, Some(0.2));
                assert!(unified);
                assert_eq!(prompt, "hello");
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_endpoints_flags_conflict() {
        let result =
            Cli::try_parse_from(["modelgate", "endpoints", "--namespace", "openai", "--unified"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_request_uses_defaults() {
        let mut settings = Settings::default();
        settings.defaults.max_output_tokens = Some(512);

        let request = build_request(&settings, "hi".into(), None, None, None, None);
        assert_eq!(request.model_name, "o4-mini");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_output_tokens, Some(512));
        assert!(request.system_prompt.is_none());

        let request = build_request(
            &settings,
            "hi".into(),
            Some("o3".into()),
            Some("terse".into()),
            Some(1.0),
            Some(64),
        );
        assert_eq!(request.model_name, "o3");
        assert_eq!(request.system_prompt.as_deref(), Some("terse"));
        assert_eq!(request.max_output_tokens, Some(64));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["modelgate", "status", "--config", "~/alt.json"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("~/alt.json"));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_models_listing_from_empty_settings() {
        let registry = build_registry(&Settings::default()).unwrap();
        assert!(registry.is_empty());
        inspect::models(&registry).unwrap();
    }
}
