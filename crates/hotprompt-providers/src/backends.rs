//! Per-provider backends.
//!
//! - [`OpenAiBackend`] — `POST {apiBase}/chat/completions`, bearer key required
//! - [`GroqBackend`] — same protocol on Groq's OpenAI-compatible base
//! - [`LocalBackend`] — `POST <url>` verbatim, key optional, also reads the
//!   native Ollama `/api/chat` shape

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use hotprompt_core::config::schema::{LocalConfig, ProviderConfig};
use hotprompt_core::error::{ChatResult, DispatchError};
use hotprompt_core::types::{
    AssistantMessage, ChatCompletionResponse, Completion, Provider, UsageInfo,
};

use crate::http_provider::{extract_first_choice, malformed, parse_chat_completion, HttpExchange};
use crate::registry::spec;
use crate::request::ChatRequest;
use crate::traits::ChatBackend;

/// Build `{base}/chat/completions`, tolerating a trailing slash.
pub fn completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

fn hosted_exchange(
    provider: Provider,
    config: &ProviderConfig,
    timeout: Duration,
) -> anyhow::Result<HttpExchange> {
    let api_base = config
        .api_base
        .as_deref()
        .unwrap_or(spec(provider).default_endpoint);
    HttpExchange::new(
        provider,
        completions_url(api_base),
        Some(config.api_key.clone()),
        config.extra_headers.as_ref(),
        timeout,
    )
}

/// The shared hosted flow: require a key, POST, read the first choice.
async fn complete_hosted(exchange: &HttpExchange, request: &ChatRequest) -> ChatResult {
    let provider = request.provider();
    if spec(provider).requires_key && !exchange.has_key() {
        return Err(DispatchError::MissingCredential(provider));
    }

    let body = exchange.post_json(&request.to_wire()).await?;
    let (text, usage) = parse_chat_completion(provider, &body)?;
    Ok(finish(provider, request, &text, usage))
}

fn finish(
    provider: Provider,
    request: &ChatRequest,
    text: &str,
    usage: Option<UsageInfo>,
) -> Completion {
    let completion = Completion::new(text, provider, request.model()).with_usage(usage);
    debug!(
        provider = provider.name(),
        model = request.model(),
        chars = completion.text.chars().count(),
        total_tokens = ?completion.usage.as_ref().map(|u| u.total_tokens),
        "Completion received"
    );
    completion
}

// ─────────────────────────────────────────────
// OpenAI
// ─────────────────────────────────────────────

/// OpenAI chat completions API.
#[derive(Debug)]
pub struct OpenAiBackend {
    exchange: HttpExchange,
}

impl OpenAiBackend {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            exchange: hosted_exchange(Provider::OpenAi, config, timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.exchange.url()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(&self, request: &ChatRequest) -> ChatResult {
        complete_hosted(&self.exchange, request).await
    }
}

// ─────────────────────────────────────────────
// Groq
// ─────────────────────────────────────────────

/// Groq's OpenAI-compatible API.
#[derive(Debug)]
pub struct GroqBackend {
    exchange: HttpExchange,
}

impl GroqBackend {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            exchange: hosted_exchange(Provider::Groq, config, timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.exchange.url()
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn complete(&self, request: &ChatRequest) -> ChatResult {
        complete_hosted(&self.exchange, request).await
    }
}

// ─────────────────────────────────────────────
// Local
// ─────────────────────────────────────────────

/// Ollama's native `/api/chat` answer (non-streaming).
#[derive(Debug, Deserialize)]
struct NativeChatResponse {
    message: AssistantMessage,
}

/// A local OpenAI-compatible (or Ollama-native) endpoint.
#[derive(Debug)]
pub struct LocalBackend {
    exchange: HttpExchange,
}

impl LocalBackend {
    pub fn new(config: &LocalConfig, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            exchange: HttpExchange::new(
                Provider::Local,
                config.url.clone(),
                config.api_key.clone(),
                None,
                timeout,
            )?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.exchange.url()
    }

    fn parse(body: &str) -> Result<(String, Option<UsageInfo>), DispatchError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| malformed(Provider::Local, format!("invalid JSON: {e}")))?;

        if value.get("choices").is_some() {
            let response: ChatCompletionResponse = serde_json::from_value(value)
                .map_err(|e| malformed(Provider::Local, e.to_string()))?;
            return extract_first_choice(Provider::Local, response);
        }

        if value.get("message").is_some() {
            let native: NativeChatResponse = serde_json::from_value(value)
                .map_err(|e| malformed(Provider::Local, e.to_string()))?;
            return Ok((native.message.content.unwrap_or_default(), None));
        }

        Err(malformed(Provider::Local, "missing `choices` field".into()))
    }
}

#[async_trait]
impl ChatBackend for LocalBackend {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    async fn complete(&self, request: &ChatRequest) -> ChatResult {
        let body = self.exchange.post_json(&request.to_wire()).await?;
        let (text, usage) = Self::parse(&body)?;
        Ok(finish(Provider::Local, request, &text, usage))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hotprompt_core::error::ErrorKind;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::registry::ModelCatalog;
    use crate::request::RequestBuilder;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn request(provider: Provider) -> ChatRequest {
        let catalog = ModelCatalog::builtin();
        let model = catalog.default_model(provider).to_string();
        RequestBuilder::new(Arc::new(catalog))
            .build("You fix grammar.", "me and him goes", provider, &model)
            .unwrap()
    }

    fn hosted_config(key: &str, base: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: key.to_string(),
            api_base: Some(base.to_string()),
            extra_headers: None,
        }
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        assert_eq!(
            completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url("https://api.groq.com/openai/v1"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_endpoints() {
        let openai = OpenAiBackend::new(&ProviderConfig::default(), TIMEOUT).unwrap();
        assert_eq!(openai.endpoint(), "https://api.openai.com/v1/chat/completions");

        let groq = GroqBackend::new(&ProviderConfig::default(), TIMEOUT).unwrap();
        assert_eq!(groq.endpoint(), "https://api.groq.com/openai/v1/chat/completions");

        let local = LocalBackend::new(&LocalConfig::default(), TIMEOUT).unwrap();
        assert_eq!(local.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_openai_sends_bearer_and_exact_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "You fix grammar."},
                    {"role": "user", "content": "me and him goes"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{"message": {"content": "He and I go."}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(&hosted_config("sk-test", &server.uri()), TIMEOUT).unwrap();
        let completion = backend.complete(&request(Provider::OpenAi)).await.unwrap();
        assert_eq!(completion.text, "He and I go.");
        assert_eq!(completion.provider, Provider::OpenAi);
        assert_eq!(completion.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_groq_reads_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer gsk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
            })))
            .mount(&server)
            .await;

        let backend = GroqBackend::new(&hosted_config("gsk-test", &server.uri()), TIMEOUT).unwrap();
        let completion = backend.complete(&request(Provider::Groq)).await.unwrap();
        assert_eq!(completion.text, "ok");
        assert_eq!(completion.usage.unwrap().total_tokens, 11);
    }

    #[tokio::test]
    async fn test_hosted_without_key_never_calls_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = GroqBackend::new(&hosted_config("", &server.uri()), TIMEOUT).unwrap();
        let err = backend.complete(&request(Provider::Groq)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_local_without_key_sends_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": " local answer "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = LocalConfig {
            url: format!("{}/v1/chat/completions", server.uri()),
            ..Default::default()
        };
        let backend = LocalBackend::new(&config, TIMEOUT).unwrap();
        let completion = backend.complete(&request(Provider::Local)).await.unwrap();
        assert_eq!(completion.text, "local answer");

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_local_native_ollama_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2",
                "message": {"role": "assistant", "content": "Hola\n"},
                "done": true
            })))
            .mount(&server)
            .await;

        let config = LocalConfig {
            url: format!("{}/api/chat", server.uri()),
            ..Default::default()
        };
        let backend = LocalBackend::new(&config, TIMEOUT).unwrap();
        let completion = backend.complete(&request(Provider::Local)).await.unwrap();
        assert_eq!(completion.text, "Hola");
        assert!(completion.usage.is_none());
    }

    #[tokio::test]
    async fn test_local_unrecognized_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "generate-style answer"
            })))
            .mount(&server)
            .await;

        let config = LocalConfig {
            url: server.uri(),
            ..Default::default()
        };
        let backend = LocalBackend::new(&config, TIMEOUT).unwrap();
        let err = backend.complete(&request(Provider::Local)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_local_not_running_is_unreachable() {
        let config = LocalConfig {
            url: "http://127.0.0.1:1/v1/chat/completions".into(),
            ..Default::default()
        };
        let backend = LocalBackend::new(&config, TIMEOUT).unwrap();
        let err = backend.complete(&request(Provider::Local)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unreachable);
    }

    #[tokio::test]
    async fn test_empty_text_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "   \n "}}]
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(&hosted_config("k", &server.uri()), TIMEOUT).unwrap();
        let completion = backend.complete(&request(Provider::OpenAi)).await.unwrap();
        assert_eq!(completion.text, "");
    }
}
