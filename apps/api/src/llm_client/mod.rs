//! LLM client: the single point of entry for all completion API calls.
//!
//! No other module may call the completion API directly.
//! Workflow code depends on the `Completion` trait, never on `LlmClient` itself.
//!
//! Speaks the OpenAI-compatible `chat/completions` protocol.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[cfg(test)]
pub mod scripted;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Rate limits, server errors and transport failures are worth another attempt.
    /// An unreadable success body is not.
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => !e.is_decode(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyContent => false,
        }
    }
}

/// A text-in, text-out completion service.
///
/// Implemented by `LlmClient` for the real API; tests substitute a scripted backend.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Sends `prompt` with the given system instruction and returns the trimmed reply.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single completion client used by the contract workflow.
/// Wraps the chat completions API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_retries: u32,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: &str, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the attempt count (minimum 1) and the base backoff delay.
    pub fn with_retry_policy(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.backoff = backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut attempt: u32 = 1;
        loop {
            let error = match self.send_once(&request_body).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() || attempt >= self.max_retries => return Err(e),
                Err(e) => e,
            };

            // Exponential backoff: 1x, 2x, 4x the base delay
            let delay = self.backoff * (1 << (attempt - 1));
            warn!(
                "LLM call attempt {} failed ({}), retrying after {}ms...",
                attempt,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(&self, request_body: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips a surrounding ```lang ... ``` code fence from LLM output.
/// Text without a leading fence is returned trimmed but otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `markdown`, `text`) on the opening line.
    let body = match stripped.find('\n') {
        Some(idx) => &stripped[idx + 1..],
        None => stripped,
    };
    body.trim_end()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(body.trim())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let input = "```markdown\nSERVICE AGREEMENT\nTerms.\n```";
        assert_eq!(strip_code_fences(input), "SERVICE AGREEMENT\nTerms.");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\nNDA\n```";
        assert_eq!(strip_code_fences(input), "NDA");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "  Plain contract text  ";
        assert_eq!(strip_code_fences(input), "Plain contract text");
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body.to_string()), "Incorrect API key provided");
        assert_eq!(error_message("bad gateway".to_string()), "bad gateway");
    }

    /// Starts a local stand-in for the chat completions API.
    /// The n-th request (0-based) is answered by `responder(n)`.
    async fn spawn_fake_api(
        responder: fn(usize) -> (StatusCode, Value),
    ) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                        assert_eq!(body["messages"][0]["role"], "system");
                        assert_eq!(body["messages"][1]["role"], "user");
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        let (status, value) = responder(n);
                        (status, Json(value))
                    },
                ),
            )
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), hits)
    }

    fn client_for(base_url: &str) -> LlmClient {
        LlmClient::new(
            "sk-test".to_string(),
            base_url,
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_retry_policy(3, Duration::from_millis(10))
    }

    fn reply(content: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5}
        })
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_reply() {
        let (base, hits) = spawn_fake_api(|_| (StatusCode::OK, reply("  employment agreement\n"))).await;
        let text = client_for(&base).complete("proposal", "system").await.unwrap();
        assert_eq!(text, "employment agreement");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let (base, hits) = spawn_fake_api(|n| {
            if n == 0 {
                (StatusCode::SERVICE_UNAVAILABLE, json!({"error": {"message": "overloaded"}}))
            } else {
                (StatusCode::OK, reply("ok"))
            }
        })
        .await;
        let text = client_for(&base).complete("p", "s").await.unwrap();
        assert_eq!(text, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_fail_immediately() {
        let (base, hits) = spawn_fake_api(|_| {
            (StatusCode::UNAUTHORIZED, json!({"error": {"message": "Incorrect API key provided"}}))
        })
        .await;
        let err = client_for(&base).complete("p", "s").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted_reports_last_error() {
        let (base, hits) = spawn_fake_api(|_| {
            (StatusCode::TOO_MANY_REQUESTS, json!({"error": {"message": "slow down"}}))
        })
        .await;
        let err = client_for(&base).complete("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_still_makes_one_attempt() {
        let (base, hits) = spawn_fake_api(|_| {
            (StatusCode::BAD_GATEWAY, json!({"error": {"message": "upstream down"}}))
        })
        .await;
        let client = client_for(&base).with_retry_policy(0, Duration::from_millis(10));
        let err = client.complete("p", "s").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_only_transient_failures_are_retryable() {
        let api = |status| LlmError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!LlmError::EmptyContent.is_retryable());
    }

    #[tokio::test]
    async fn test_blank_content_is_an_error() {
        let (base, _) = spawn_fake_api(|_| (StatusCode::OK, reply("   "))).await;
        let err = client_for(&base).complete("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
