//! `modelgate generate` and `modelgate tokens`.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use modelgate_core::GenerationRequest;
use modelgate_providers::{ModelProvider, ProviderRegistry, UnifiedProvider};

use crate::helpers;

/// Send one prompt and print the response.
///
/// With `unified`, routing goes through the unified endpoint map before the
/// registry; otherwise the registry must know the model.
pub async fn run(
    registry: Arc<ProviderRegistry>,
    request: GenerationRequest,
    unified: bool,
) -> Result<()> {
    let provider: Arc<dyn ModelProvider> = if unified {
        Arc::new(UnifiedProvider::from_env(registry))
    } else {
        registry
            .get_provider_for_model(&request.model_name)
            .with_context(|| {
                format!(
                    "no configured provider serves model '{}' (try --unified or `modelgate models`)",
                    request.model_name
                )
            })?
    };

    info!(
        model = %request.model_name,
        provider = %provider.provider_type(),
        "generating"
    );

    helpers::print_thinking();
    let result = provider.generate_content(&request).await;
    helpers::clear_thinking();

    let response = result.with_context(|| format!("generation with '{}' failed", request.model_name))?;
    helpers::print_response(&response);
    Ok(())
}

/// Count tokens for `text`, falling back to an estimate when no provider
/// serves the model.
pub async fn tokens(registry: Arc<ProviderRegistry>, model: &str, text: &str) -> Result<()> {
    let unified = UnifiedProvider::from_env(registry);
    let served = unified.validate_model_name(model);
    let count = unified
        .count_tokens(text, model)
        .await
        .with_context(|| format!("token count for '{model}' failed"))?;

    println!(
        "{} {}",
        count.to_string().bold(),
        if served {
            format!("tokens ({model})").dimmed()
        } else {
            "tokens (estimate: no provider serves this model)".dimmed()
        }
    );
    Ok(())
}
