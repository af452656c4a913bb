//! Provider registry — static specs and the model catalog.
//!
//! Each `ProviderSpec` describes how to reach one backend: default API base,
//! credential env var, and the builtin model list. `ModelCatalog` is the
//! read-only provider → models mapping built once at startup.

use hotprompt_core::config::Config;
use hotprompt_core::types::Provider;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// The variant this spec belongs to.
    pub provider: Provider,
    /// Default endpoint. For hosted providers this is the API base
    /// (`/chat/completions` is appended); for Local it is the full URL.
    pub default_endpoint: &'static str,
    /// Whether dispatch requires an API key.
    pub requires_key: bool,
    /// Builtin model identifiers, first is the default.
    pub models: &'static [&'static str],
}

static GROQ: ProviderSpec = ProviderSpec {
    provider: Provider::Groq,
    default_endpoint: "https://api.groq.com/openai/v1",
    requires_key: true,
    models: &[
        "llama-3.2-90b-text-preview",
        "llama-3.1-8b-instant",
        "gemma2-9b-it",
        "mixtral-8x7b-32768",
    ],
};

static OPENAI: ProviderSpec = ProviderSpec {
    provider: Provider::OpenAi,
    default_endpoint: "https://api.openai.com/v1",
    requires_key: true,
    models: &["gpt-4o-mini", "gpt-4o", "gpt-4-turbo"],
};

static LOCAL: ProviderSpec = ProviderSpec {
    provider: Provider::Local,
    default_endpoint: hotprompt_core::config::schema::DEFAULT_LOCAL_URL,
    requires_key: false,
    models: &["llama3.2", "custom"],
};

/// All provider specs, in `Provider::ALL` order.
pub static PROVIDERS: [&ProviderSpec; 3] = [&GROQ, &OPENAI, &LOCAL];

/// Spec for a provider. Total over the enum.
pub fn spec(provider: Provider) -> &'static ProviderSpec {
    match provider {
        Provider::Groq => &GROQ,
        Provider::OpenAi => &OPENAI,
        Provider::Local => &LOCAL,
    }
}

// ─────────────────────────────────────────────
// ModelCatalog
// ─────────────────────────────────────────────

/// Provider → ordered, non-empty, duplicate-free model identifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelCatalog {
    groq: Vec<String>,
    openai: Vec<String>,
    local: Vec<String>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    /// Catalog with the builtin model lists only.
    pub fn builtin() -> Self {
        let owned = |p: Provider| -> Vec<String> {
            spec(p).models.iter().map(|m| m.to_string()).collect()
        };
        Self {
            groq: owned(Provider::Groq),
            openai: owned(Provider::OpenAi),
            local: owned(Provider::Local),
        }
    }

    /// Builtin catalog with the local list replaced by `providers.local.models`.
    ///
    /// Entries are trimmed, blanks and duplicates dropped (first occurrence
    /// wins). An override that ends up empty is ignored.
    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::builtin();
        let local = normalize_models(&config.providers.local.models);
        if !local.is_empty() {
            catalog.local = local;
        }
        catalog
    }

    /// Models available for `provider`, default first. Never empty.
    pub fn models_for(&self, provider: Provider) -> &[String] {
        match provider {
            Provider::Groq => &self.groq,
            Provider::OpenAi => &self.openai,
            Provider::Local => &self.local,
        }
    }

    /// The first model of `provider`'s list.
    pub fn default_model(&self, provider: Provider) -> &str {
        // Non-empty by construction: builtin lists are non-empty and empty
        // overrides are rejected in `from_config`.
        &self.models_for(provider)[0]
    }

    /// Whether `model` is offered for `provider`.
    pub fn contains(&self, provider: Provider, model: &str) -> bool {
        self.models_for(provider).iter().any(|m| m == model)
    }
}

fn normalize_models(models: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(models.len());
    for model in models.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
        if !out.iter().any(|m| m == model) {
            out.push(model.to_string());
        }
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
