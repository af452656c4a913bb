//! The invocation pipeline.
//!
//! One invocation: snapshot the system instruction, build and validate the
//! request, run one request/response cycle, then hand a successful result
//! to the sink. Nothing is retried; every failure is terminal for that
//! invocation only.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use hotprompt_core::config::Config;
use hotprompt_core::error::{ChatResult, DispatchError};
use hotprompt_core::prompt_store::PromptStore;
use hotprompt_core::types::{Completion, Provider};
use hotprompt_delivery::{DeliveryReport, ResultSink};
use hotprompt_providers::{CompletionClient, ModelCatalog, RequestBuilder};

/// Outcome of a delivered invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub completion: Completion,
    pub delivery: DeliveryReport,
}

/// Wires the prompt store, request builder, completion client, and sink.
///
/// Holds no per-invocation state, so any number of invocations can run
/// against one `Assistant` at the same time.
pub struct Assistant {
    builder: RequestBuilder,
    prompts: Arc<PromptStore>,
    client: CompletionClient,
    sink: Arc<dyn ResultSink>,
}

impl Assistant {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        prompts: Arc<PromptStore>,
        client: CompletionClient,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            builder: RequestBuilder::new(catalog),
            prompts,
            client,
            sink,
        }
    }

    /// Build the catalog and HTTP backends from `config`.
    pub fn from_config(
        config: &Config,
        prompts: Arc<PromptStore>,
        sink: Arc<dyn ResultSink>,
    ) -> anyhow::Result<Self> {
        let catalog = Arc::new(ModelCatalog::from_config(config));
        let client = CompletionClient::from_config(config)?;
        Ok(Self::new(catalog, prompts, client, sink))
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.builder.catalog()
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    /// Run one request/response cycle without delivering the result.
    ///
    /// The instruction is read once, before the request is built; a
    /// concurrent `PromptStore::set` affects only later calls.
    pub async fn dispatch(&self, text: &str, provider: Provider, model: &str) -> ChatResult {
        let instruction = self.prompts.current();
        let request = self.builder.build(&instruction, text, provider, model)?;
        self.client.dispatch(&request).await
    }

    /// Dispatch, then deliver a successful result exactly once.
    pub async fn invoke(
        &self,
        text: &str,
        provider: Provider,
        model: &str,
    ) -> Result<Invocation, DispatchError> {
        let started = Instant::now();

        let completion = match self.dispatch(text, provider, model).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    model,
                    kind = %e.kind(),
                    "Invocation failed: {}",
                    e.detail()
                );
                return Err(e);
            }
        };

        let delivery = match self.sink.deliver(&completion.text).await {
            Ok(report) => report,
            Err(e) => {
                warn!(provider = provider.name(), "Delivery failed: {}", e.detail());
                return Err(e);
            }
        };

        info!(
            provider = provider.name(),
            model,
            chars = completion.text.chars().count(),
            pasted = delivery.pasted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Invocation complete"
        );
        Ok(Invocation {
            completion,
            delivery,
        })
    }

    /// Run [`invoke`](Self::invoke) on its own task.
    ///
    /// The task is independent of the caller: dropping the handle does not
    /// cancel the request.
    pub fn spawn_invocation(
        self: Arc<Self>,
        text: String,
        provider: Provider,
        model: String,
    ) -> JoinHandle<Result<Invocation, DispatchError>> {
        tokio::spawn(async move { self.invoke(&text, provider, &model).await })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
