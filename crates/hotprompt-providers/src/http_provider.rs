//! Shared HTTP plumbing for every backend.
//!
//! `HttpExchange` owns the connection-pooled client, the endpoint, the
//! optional bearer credential and the timeout. It POSTs the JSON body and
//! turns transport-level problems into classified `DispatchError`s; the
//! backends only decide how to read a successful body.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use hotprompt_core::error::DispatchError;
use hotprompt_core::types::{ChatCompletionRequest, ChatCompletionResponse, Provider, UsageInfo};
use hotprompt_core::utils::{single_line, truncate_string};

/// Maximum characters of an error body kept for diagnostics.
pub const SNIPPET_LEN: usize = 200;

// ─────────────────────────────────────────────
// HttpExchange
// ─────────────────────────────────────────────

/// A single endpoint plus the credentials and limits to call it with.
pub struct HttpExchange {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// Provider this endpoint belongs to (for errors and logs).
    provider: Provider,
    /// Full URL the request is POSTed to.
    url: String,
    /// Bearer token, if the endpoint needs one.
    api_key: Option<String>,
    /// Extra headers sent with each request.
    extra_headers: HeaderMap,
    /// Upper bound for the whole exchange, body included.
    timeout: Duration,
}

impl std::fmt::Debug for HttpExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExchange")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("has_key", &self.api_key.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpExchange {
    /// Create an exchange for `url`.
    ///
    /// Blank keys are treated as absent. Invalid extra headers are skipped
    /// with a warning.
    pub fn new(
        provider: Provider,
        url: impl Into<String>,
        api_key: Option<String>,
        extra_headers: Option<&HashMap<String, String>>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in extra_headers.into_iter().flatten() {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    headers.insert(name, val);
                }
                _ => warn!(provider = provider.name(), "Invalid header: {}", key),
            }
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpExchange {
            client,
            provider,
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            extra_headers: headers,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST `body` and return the raw response text of a 2xx answer.
    ///
    /// Non-2xx answers become `TransportFailure` with a one-line, truncated
    /// body snippet. The credential never appears in logs or errors.
    pub async fn post_json(&self, body: &ChatCompletionRequest) -> Result<String, DispatchError> {
        debug!(
            provider = self.provider.name(),
            model = %body.model,
            url = %self.url,
            "Calling LLM"
        );

        let mut request = self
            .client
            .post(&self.url)
            .headers(self.extra_headers.clone())
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let snippet = truncate_string(&single_line(&text), SNIPPET_LEN);
            error!(
                provider = self.provider.name(),
                status = %status,
                body = %snippet,
                "API error"
            );
            return Err(DispatchError::TransportFailure {
                provider: self.provider,
                status: status.as_u16(),
                snippet,
            });
        }

        Ok(text)
    }

    /// Map a reqwest error to the matching dispatch error.
    fn classify(&self, e: reqwest::Error) -> DispatchError {
        if e.is_timeout() {
            warn!(provider = self.provider.name(), timeout = ?self.timeout, "LLM call timed out");
            return DispatchError::Timeout {
                provider: self.provider,
                after: self.timeout,
            };
        }

        let reason = if e.is_builder() {
            format!("invalid endpoint URL '{}': {e}", self.url)
        } else if e.is_connect() {
            format!("cannot connect to {}: {e}", self.url)
        } else if e.is_body() || e.is_decode() {
            format!("connection dropped while reading the response: {e}")
        } else {
            e.to_string()
        };

        if self.provider == Provider::Local && e.is_connect() {
            // No local server running is an everyday situation, not a fault.
            warn!(provider = self.provider.name(), error = %e, "Local endpoint unreachable");
        } else {
            error!(provider = self.provider.name(), reason = %reason, "HTTP request failed");
        }
        DispatchError::Unreachable {
            provider: self.provider,
            reason,
        }
    }
}

// ─────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────

/// Read `choices[0].message.content` from an OpenAI-compatible body.
///
/// A `null` content yields an empty string; a missing or empty `choices`
/// array is a malformed response.
pub fn parse_chat_completion(
    provider: Provider,
    body: &str,
) -> Result<(String, Option<UsageInfo>), DispatchError> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| malformed(provider, format!("invalid JSON: {e}")))?;
    extract_first_choice(provider, response)
}

/// Same as [`parse_chat_completion`] for an already-decoded document.
pub fn extract_first_choice(
    provider: Provider,
    response: ChatCompletionResponse,
) -> Result<(String, Option<UsageInfo>), DispatchError> {
    let choices = response
        .choices
        .ok_or_else(|| malformed(provider, "missing `choices` field".into()))?;
    let first = choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed(provider, "no completion choices".into()))?;

    if let Some(reason) = first.finish_reason.as_deref() {
        debug!(provider = provider.name(), finish_reason = reason, "LLM response received");
    }

    Ok((first.message.content.unwrap_or_default(), response.usage))
}

pub(crate) fn malformed(provider: Provider, reason: String) -> DispatchError {
    error!(provider = provider.name(), reason = %reason, "Failed to parse LLM response");
    DispatchError::MalformedResponse { provider, reason }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hotprompt_core::error::ErrorKind;
    use hotprompt_core::types::Message;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "m".into(),
            messages: vec![Message::system("s"), Message::user("u")],
        }
    }

    fn exchange(url: String, key: Option<&str>) -> HttpExchange {
        HttpExchange::new(
            Provider::OpenAi,
            url,
            key.map(String::from),
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    // ── Parsing ──

    #[test]
    fn test_parse_success() {
        let (text, usage) = parse_chat_completion(
            Provider::Groq,
            r#"{"choices":[{"message":{"content":"  Hello  "}}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
        )
        .unwrap();
        assert_eq!(text, "  Hello  ");
        assert_eq!(usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_parse_missing_choices() {
        let err = parse_chat_completion(Provider::Groq, "{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.to_string().contains("choices"));
    }

    #[test]
    fn test_parse_empty_choices() {
        let err = parse_chat_completion(Provider::Groq, r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_chat_completion(Provider::OpenAi, "<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_parse_choice_without_message() {
        let err = parse_chat_completion(Provider::OpenAi, r#"{"choices":[{"index":0}]}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_parse_null_content_is_empty() {
        let (text, _) =
            parse_chat_completion(Provider::OpenAi, r#"{"choices":[{"message":{"content":null}}]}"#)
                .unwrap();
        assert_eq!(text, "");
    }

    // ── Exchange ──

    #[test]
    fn test_blank_key_is_absent() {
        let ex = exchange("http://localhost".into(), Some("  "));
        assert!(!ex.has_key());
    }

    #[test]
    fn test_debug_hides_key() {
        let ex = exchange("http://localhost".into(), Some("sk-secret"));
        let dbg = format!("{:?}", ex);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("has_key: true"));
    }

    #[tokio::test]
    async fn test_post_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("Authorization", "Bearer sk-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let ex = exchange(format!("{}/chat", server.uri()), Some("sk-abc"));
        assert_eq!(ex.post_json(&body()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_error_snippet_truncated_to_one_line() {
        let server = MockServer::start().await;
        let long_body = format!("{{\n \"error\": \"{}\"\n}}", "x".repeat(500));
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string(long_body))
            .mount(&server)
            .await;

        let ex = exchange(server.uri(), None);
        let err = ex.post_json(&body()).await.unwrap_err();
        match err {
            DispatchError::TransportFailure { status, snippet, .. } => {
                assert_eq!(status, 503);
                assert_eq!(snippet.chars().count(), SNIPPET_LEN);
                assert!(snippet.starts_with("{ \"error\""));
                assert!(!snippet.contains('\n'));
            }
            other => panic!("expected TransportFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let ex = HttpExchange::new(
            Provider::Groq,
            server.uri(),
            None,
            None,
            Duration::from_millis(100),
        )
        .unwrap();
        let err = ex.post_json(&body()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_classified() {
        // Point to a port that's not listening
        let ex = exchange("http://127.0.0.1:1/chat".into(), None);
        let err = ex.post_json(&body()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unreachable);
        assert!(err.detail().contains("cannot connect"), "{}", err.detail());
    }

    #[tokio::test]
    async fn test_bad_url_reported_as_invalid_endpoint() {
        let ex = exchange("not a url".into(), None);
        let err = ex.post_json(&body()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unreachable);
        assert!(err.detail().contains("invalid endpoint URL"), "{}", err.detail());
        assert!(!err.detail().contains("cannot connect"));
    }

    #[tokio::test]
    async fn test_extra_headers_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Org", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HashMap::new();
        headers.insert("X-Org".to_string(), "acme".to_string());
        headers.insert("bad header".to_string(), "ignored".to_string());
        let ex = HttpExchange::new(
            Provider::OpenAi,
            server.uri(),
            None,
            Some(&headers),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(ex.post_json(&body()).await.unwrap(), "ok");
    }
}
