//! Core types for Hotprompt — the provider variant, chat messages, and the
//! OpenAI-compatible wire format shared by every backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// The backend family a completion is obtained from.
///
/// Each variant determines transport, authentication, and response parsing.
/// Adding a provider means adding a variant here, a spec in the registry,
/// and one `ChatBackend` implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Groq hosted API (OpenAI-compatible, bearer auth).
    Groq,
    /// OpenAI hosted API (bearer auth).
    #[serde(rename = "openai")]
    OpenAi,
    /// A user-configured local endpoint (Ollama, llama.cpp server, LM Studio…).
    Local,
}

impl Provider {
    /// All providers, in the order they are offered to the user.
    pub const ALL: [Provider; 3] = [Provider::Groq, Provider::OpenAi, Provider::Local];

    /// Internal lowercase name, as used in config files and env vars.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Local => "local",
        }
    }

    /// Human-readable name for menus and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAi => "OpenAI",
            Provider::Local => "Local LLM",
        }
    }

    /// Conventional environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Local => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a string names no known provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}' (expected one of: groq, openai, local)")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    /// Accepts internal names and display names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == wanted || p.display_name().to_lowercase() == wanted)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

/// Request body sent to every provider's chat-completion endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// Raw chat completion response from an OpenAI-compatible API.
///
/// `choices` is optional so that a missing field can be reported as a
/// malformed response rather than a generic decode error.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
    pub usage: Option<UsageInfo>,
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
    /// Some providers send `null` content (e.g. on content filtering).
    pub content: Option<String>,
}

/// Token usage statistics reported by the provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Completion
// ─────────────────────────────────────────────

/// A successful dispatch: the normalized assistant text.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    /// Assistant text, trimmed. May be empty if the provider returned nothing.
    pub text: String,
    /// Provider that produced it.
    pub provider: Provider,
    /// Model identifier the request was sent with.
    pub model: String,
    /// Token usage, when the provider reports it.
    pub usage: Option<UsageInfo>,
}

impl Completion {
    /// Build a completion, trimming surrounding whitespace from `text`.
    pub fn new(text: &str, provider: Provider, model: impl Into<String>) -> Self {
        Completion {
            text: text.trim().to_string(),
            provider,
            model: model.into(),
            usage: None,
        }
    }

    /// Attach usage statistics.
    pub fn with_usage(mut self, usage: Option<UsageInfo>) -> Self {
        self.usage = usage;
        self
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
    fn test_provider_from_str_accepts_names_and_display_names() {
        assert_eq!("groq".parse::<Provider>().unwrap(), Provider::Groq);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("Local LLM".parse::<Provider>().unwrap(), Provider::Local);
        assert_eq!(" LOCAL ".parse::<Provider>().unwrap(), Provider::Local);
    }

    #[test]
    fn test_api_key_env_only_for_hosted() {
        assert_eq!(Provider::Groq.api_key_env(), Some("GROQ_API_KEY"));
        assert_eq!(Provider::OpenAi.api_key_env(), Some("OPENAI_API_KEY"));
        assert_eq!(Provider::Local.api_key_env(), None);
    }

    #[test]
    fn test_provider_from_str_unknown() {
        let err = "anthropic".parse::<Provider>().unwrap_err();
        assert_eq!(err, UnknownProvider("anthropic".into()));
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn test_provider_serde_uses_internal_names() {
        assert_eq!(serde_json::to_value(Provider::OpenAi).unwrap(), json!("openai"));
        let p: Provider = serde_json::from_value(json!("groq")).unwrap();
        assert_eq!(p, Provider::Groq);
    }

    #[test]
    fn test_request_wire_shape() {
        let req = ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![Message::system("Be brief."), Message::user("Hi")],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hi"}
                ]
            })
        );
    }

    #[test]
    fn test_response_without_choices_deserializes() {
        let resp: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_none());
        assert!(resp.usage.is_none());
    }

    #[test]
    fn test_response_null_content() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]
        }))
        .unwrap();
        let choice = &resp.choices.unwrap()[0];
        assert!(choice.message.content.is_none());
        assert_eq!(choice.finish_reason.as_deref(), Some("content_filter"));
    }

    #[test]
    fn test_completion_trims_text() {
        let c = Completion::new("  Hello \n", Provider::Groq, "gemma2-9b-it");
        assert_eq!(c.text, "Hello");
        assert_eq!(c.model, "gemma2-9b-it");
        assert!(c.usage.is_none());
    }
}
