//! `modelgate init` — write a default settings file and an endpoint
//! override template.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use modelgate_core::config::{get_config_path, save_settings, Settings};

/// Run the init command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "Modelgate — Setup".cyan().bold());
    println!();

    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    // 1. Settings file (defaults only, never env-derived keys)
    if config_path.exists() {
        println!(
            "  {} settings already exist at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_settings(&Settings::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created settings at {}",
            "✓".green(),
            config_path.display()
        );
    }

    // 2. Endpoint override template next to it
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let template = dir.join("endpoints.example.json");
    create_template(&template, ENDPOINTS_TEMPLATE)?;

    println!();
    println!("  Next steps:");
    println!("    - set OPENAI_API_KEY / GEMINI_API_KEY / XAI_API_KEY / DIAL_API_KEY");
    println!(
        "    - point OPENAI_ENDPOINTS_CONFIG or UNIFIED_ENDPOINTS_CONFIG at a copy of {}",
        template.display()
    );
    println!();
    println!("{}", "  Setup complete! Run `modelgate status` to check.".green());
    println!();

    Ok(())
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

const ENDPOINTS_TEMPLATE: &str = r#"{
  "openai_endpoints": {
    "o3": { "base_url": "https://my-proxy.example.com/v1", "api_key": "" }
  },
  "google_endpoints": {
    "gemini-2.5-pro": { "base_url": "https://gemini-proxy.example.com" }
  },
  "model_endpoints": {
    "llama-3": { "base_url": "http://localhost:11434/v1", "api_key": "" }
  }
}
"#;
