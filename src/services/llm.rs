use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the language model provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited | LlmError::Timeout(_) | LlmError::RequestError(_) => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Unauthorized | LlmError::InvalidResponse(_) => false,
        }
    }
}

/// Generation parameters sent with every completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            max_tokens: 500,
        }
    }
}

/// A single-shot chat completion collaborator
///
/// Implementations take a system instruction and a user prompt and return
/// the generated text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client
///
/// Talks to `{base_url}/chat/completions`; any provider exposing the same
/// endpoint shape works.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client with the given request timeout
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &options.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!("Requesting completion from {} (model: {})", url, options.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
                StatusCode::UNAUTHORIZED => LlmError::Unauthorized,
                _ => LlmError::ApiError {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Completion contained no text".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CompletionOptions::default();
        assert_eq!(options.model, "gpt-3.5-turbo");
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.max_tokens, 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LlmError::RateLimited.is_retryable());
        assert!(LlmError::Timeout(100).is_retryable());
        assert!(LlmError::ApiError { status: 503, message: String::new() }.is_retryable());
        assert!(!LlmError::ApiError { status: 400, message: String::new() }.is_retryable());
        assert!(!LlmError::Unauthorized.is_retryable());
    }

    #[tokio::test]
    async fn test_complete_parses_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  A cosy home.  "}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(server.url(), "test-key".to_string(), Duration::from_secs(5)).unwrap();
        let text = client
            .complete("system", "prompt", &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(text, "A cosy home.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .create_async()
            .await;

        let client = OpenAiClient::new(server.url(), "k".to_string(), Duration::from_secs(5)).unwrap();
        let err = client
            .complete("system", "prompt", &CompletionOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(server.url(), "k".to_string(), Duration::from_secs(5)).unwrap();
        let err = client
            .complete("system", "prompt", &CompletionOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
