//! Completion client — routes a `ChatRequest` to its provider's backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use hotprompt_core::config::Config;
use hotprompt_core::error::ChatResult;
use hotprompt_core::types::Provider;

use crate::backends::{GroqBackend, LocalBackend, OpenAiBackend};
use crate::registry::spec;
use crate::request::ChatRequest;
use crate::traits::ChatBackend;

/// Holds one backend per provider and dispatches to the right one.
///
/// Backends share nothing mutable, so concurrent dispatches from separate
/// invocations never interact.
#[derive(Clone)]
pub struct CompletionClient {
    groq: Arc<dyn ChatBackend>,
    openai: Arc<dyn ChatBackend>,
    local: Arc<dyn ChatBackend>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("providers", &Provider::ALL)
            .finish()
    }
}

impl CompletionClient {
    /// Assemble a client from explicit backends.
    ///
    /// Each backend must report the provider of the slot it is placed in.
    pub fn new(
        groq: Arc<dyn ChatBackend>,
        openai: Arc<dyn ChatBackend>,
        local: Arc<dyn ChatBackend>,
    ) -> Self {
        debug_assert_eq!(groq.provider(), Provider::Groq);
        debug_assert_eq!(openai.provider(), Provider::OpenAi);
        debug_assert_eq!(local.provider(), Provider::Local);
        Self {
            groq,
            openai,
            local,
        }
    }

    /// Build the HTTP backends for every provider from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.dispatch.timeout_secs.max(1));
        let providers = &config.providers;

        for provider in Provider::ALL {
            if spec(provider).requires_key && !providers.is_ready(provider) {
                info!(provider = provider.name(), "No API key configured");
            }
        }

        Ok(Self::new(
            Arc::new(GroqBackend::new(&providers.groq, timeout)?),
            Arc::new(OpenAiBackend::new(&providers.openai, timeout)?),
            Arc::new(LocalBackend::new(&providers.local, timeout)?),
        ))
    }

    /// Swap in a different backend for the provider it reports.
    pub fn with_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        match backend.provider() {
            Provider::Groq => self.groq = backend,
            Provider::OpenAi => self.openai = backend,
            Provider::Local => self.local = backend,
        }
        self
    }

    /// The backend serving `provider`.
    pub fn backend(&self, provider: Provider) -> &dyn ChatBackend {
        match provider {
            Provider::Groq => self.groq.as_ref(),
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Local => self.local.as_ref(),
        }
    }

    /// Perform one request/response cycle. Failures are returned as-is.
    pub async fn dispatch(&self, request: &ChatRequest) -> ChatResult {
        let provider = request.provider();
        debug!(
            provider = provider.name(),
            model = request.model(),
            input_chars = request.user_text().chars().count(),
            "Dispatching"
        );

        let result = self.backend(provider).complete(request).await;
        match &result {
            Ok(completion) if completion.text.is_empty() => {
                warn!(provider = provider.name(), model = request.model(), "Provider returned no text");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(provider = provider.name(), kind = %e.kind(), "Dispatch failed");
            }
        }
        result
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
