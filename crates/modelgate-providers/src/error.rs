//! Error type shared by every provider adapter.

use modelgate_core::ProviderType;

/// Failures surfaced to callers of a [`crate::ModelProvider`].
///
/// Transport failures are passed through from `reqwest` untouched; nothing
/// here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unsupported {provider} model: {model}")]
    UnsupportedModel { provider: ProviderType, model: String },

    #[error("{provider} model '{model}' is not allowed by restriction policy")]
    ModelNotAllowed { provider: ProviderType, model: String },

    #[error("No provider found for model: {0}")]
    NoProviderFound(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether the model was rejected before any network call
    /// (unknown, blocked by policy, or unroutable).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ProviderError::UnsupportedModel { .. }
                | ProviderError::ModelNotAllowed { .. }
                | ProviderError::NoProviderFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::UnsupportedModel {
            provider: ProviderType::OpenAI,
            model: "gpt-2".into(),
        };
        assert_eq!(err.to_string(), "Unsupported openai model: gpt-2");
        assert!(err.is_rejection());

        let err = ProviderError::Api {
            status: 429,
            body: "slow down".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(!err.is_rejection());
    }
}
