//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `PromptConfig`, `DispatchConfig`,
//! `DeliveryConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Provider;

/// Default system instruction when none has been saved yet.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Default endpoint for the local provider (Ollama's OpenAI-compatible API).
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:11434/v1/chat/completions";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.hotprompt/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub prompt: PromptConfig,
    pub dispatch: DispatchConfig,
    pub delivery: DeliveryConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a hosted provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Configuration for the local provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalConfig {
    /// Full chat-completions URL; the request is POSTed here verbatim.
    pub url: String,
    /// Optional key for local servers that sit behind a proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model names served locally. Empty means "use the builtin list".
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOCAL_URL.to_string(),
            api_key: None,
            models: Vec::new(),
        }
    }
}

/// All provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub groq: ProviderConfig,
    pub local: LocalConfig,
}

impl ProvidersConfig {
    /// Hosted provider config by variant. `None` for the local provider.
    pub fn hosted(&self, provider: Provider) -> Option<&ProviderConfig> {
        match provider {
            Provider::OpenAi => Some(&self.openai),
            Provider::Groq => Some(&self.groq),
            Provider::Local => None,
        }
    }

    /// Whether `provider` can be dispatched to without a credential error.
    pub fn is_ready(&self, provider: Provider) -> bool {
        self.hosted(provider).map_or(true, ProviderConfig::is_configured)
    }
}

// ─────────────────────────────────────────────
// Prompt
// ─────────────────────────────────────────────

/// System instruction and predefined prompt templates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptConfig {
    /// The active system instruction.
    pub system: String,
    /// Predefined prompts offered alongside free-form input.
    pub templates: Vec<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            templates: default_templates(),
        }
    }
}

fn default_templates() -> Vec<String> {
    [
        "Paraphrase the following text",
        "Translate the following text to English",
        "Translate the following text to Spanish",
        "Summarize the following text",
        "Explain the following concept",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

/// Request/response cycle settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchConfig {
    /// Provider preselected when none is given.
    pub default_provider: Provider,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_provider: Provider::Groq,
            timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Delivery
// ─────────────────────────────────────────────

/// Clipboard + paste settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryConfig {
    /// Send a paste keystroke after copying. `false` = copy only.
    pub paste: bool,
    /// Command (argv) that synthesizes the paste keystroke.
    /// `None` uses the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paste_command: Option<Vec<String>>,
    /// Pause between the clipboard write and the keystroke, in milliseconds.
    pub settle_delay_ms: u64,
    /// How long a one-shot run keeps the result on the clipboard when it was
    /// not pasted, so it survives the process on X11. `0` disables.
    pub clipboard_hold_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            paste: true,
            paste_command: None,
            settle_delay_ms: 50,
            clipboard_hold_secs: 10,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
