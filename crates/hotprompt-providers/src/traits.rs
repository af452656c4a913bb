//! Chat backend trait — one implementation per `Provider` variant.

use async_trait::async_trait;
use hotprompt_core::error::ChatResult;
use hotprompt_core::types::Provider;

use crate::request::ChatRequest;

/// Exchanges a system + user message pair for a single assistant message.
///
/// Implementations perform exactly one attempt: no retries, no streaming.
/// Every failure is classified into a `DispatchError` rather than panicking.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// The provider this backend talks to.
    fn provider(&self) -> Provider;

    /// Send the request and return the trimmed assistant text.
    async fn complete(&self, request: &ChatRequest) -> ChatResult;
}
