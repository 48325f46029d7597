//! Core types for Modelgate — provider tags, the normalized response record,
//! and the OpenAI chat completions wire format shared by most vendors.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────
// Provider type
// ─────────────────────────────────────────────

/// Tag identifying a family of provider adapters.
///
/// Declaration order doubles as registry precedence: native vendor APIs are
/// consulted before the catch-all custom endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Google,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "xai")]
    XAI,
    #[serde(rename = "dial")]
    DIAL,
    Custom,
    Unified,
}

impl ProviderType {
    /// All provider types in precedence order.
    pub const ALL: [ProviderType; 6] = [
        ProviderType::Google,
        ProviderType::OpenAI,
        ProviderType::XAI,
        ProviderType::DIAL,
        ProviderType::Custom,
        ProviderType::Unified,
    ];

    /// Lowercase identifier, also used as the endpoint-override namespace
    /// (`OPENAI_<MODEL>_ENDPOINT`, `GOOGLE_<MODEL>_ENDPOINT`, …).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Google => "google",
            ProviderType::OpenAI => "openai",
            ProviderType::XAI => "xai",
            ProviderType::DIAL => "dial",
            ProviderType::Custom => "custom",
            ProviderType::Unified => "unified",
        }
    }

    /// Human-readable vendor name for logs and responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderType::Google => "Gemini",
            ProviderType::OpenAI => "OpenAI",
            ProviderType::XAI => "X.AI",
            ProviderType::DIAL => "DIAL",
            ProviderType::Custom => "Custom API",
            ProviderType::Unified => "Unified OpenAI",
        }
    }

    /// Parse a lowercase identifier back into a provider type.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == lower)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Generation request
// ─────────────────────────────────────────────

/// Parameters for one content-generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    /// User prompt.
    pub prompt: String,
    /// Requested model name (canonical or alias).
    pub model_name: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Sampling temperature; adapters correct it against the model's constraint.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_name: model_name.into(),
            system_prompt: None,
            temperature: 0.7,
            max_output_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

// ─────────────────────────────────────────────
// Model response
// ─────────────────────────────────────────────

/// Normalized output of a generation call, whichever vendor produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelResponse {
    /// Generated text.
    pub content: String,
    /// Token usage, when the vendor reports it.
    pub usage: Option<UsageInfo>,
    /// Model name the vendor call was made with.
    pub model_name: String,
    /// Friendly provider name (e.g. `"OpenAI"`, `"Unified OpenAI"`).
    pub friendly_name: String,
    pub provider: ProviderType,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
}

/// Token usage statistics, normalized across vendors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl UsageInfo {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

// ─────────────────────────────────────────────
// Chat completions wire format (OpenAI-compatible)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

/// Usage block as reported by OpenAI-compatible APIs.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<ChatUsage> for UsageInfo {
    fn from(usage: ChatUsage) -> Self {
        let total = if usage.total_tokens == 0 {
            usage.prompt_tokens + usage.completion_tokens
        } else {
            usage.total_tokens
        };
        UsageInfo {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: total,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_type_precedence_order() {
        let mut shuffled = vec![
            ProviderType::Custom,
            ProviderType::DIAL,
            ProviderType::Google,
            ProviderType::XAI,
            ProviderType::OpenAI,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                ProviderType::Google,
                ProviderType::OpenAI,
                ProviderType::XAI,
                ProviderType::DIAL,
                ProviderType::Custom,
            ]
        );
    }

    #[test]
    fn test_provider_type_from_name() {
        assert_eq!(ProviderType::from_name("OpenAI"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::from_name("google"), Some(ProviderType::Google));
        assert_eq!(ProviderType::from_name("anthropic"), None);
    }

    #[test]
    fn test_provider_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ProviderType::XAI).unwrap(), json!("xai"));
        assert_eq!(serde_json::to_value(ProviderType::Google).unwrap(), json!("google"));
    }

    #[test]
    fn test_generation_request_defaults() {
        let req = GenerationRequest::new("hi", "o3");
        assert_eq!(req.temperature, 0.7);
        assert!(req.system_prompt.is_none());
        assert!(req.max_output_tokens.is_none());
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::system("Be brief.")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "Be brief.");

        let json = serde_json::to_value(Message::user("Hello")).unwrap();
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_request_omits_absent_fields() {
        let req = ChatCompletionRequest {
            model: "o3".into(),
            messages: vec![Message::user("hi")],
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_chat_response_deserialization() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": { "content": "Hi!" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        }))
        .unwrap();

        assert_eq!(resp.choices[0].message.content.as_deref(), Some("Hi!"));
        let usage: UsageInfo = resp.usage.unwrap().into();
        assert_eq!(usage, UsageInfo::new(3, 2));
    }

    #[test]
    fn test_usage_total_filled_when_missing() {
        let usage: UsageInfo = ChatUsage {
            prompt_tokens: 7,
            completion_tokens: 4,
            total_tokens: 0,
        }
        .into();
        assert_eq!(usage.total_tokens, 11);
    }
}
