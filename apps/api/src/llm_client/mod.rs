/// LLM Client: the single point of entry for all generative-text calls.
///
/// No other module talks to the completion service directly. Callers depend on
/// the `TextGenerator` trait so the client can be swapped for a mock in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Rate limits and upstream 5xx are worth retrying; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One prompt/response exchange with the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    /// Ask the service for a JSON object response.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        CompletionRequest {
            prompt: prompt.into(),
            system: None,
            temperature,
            json_mode: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Name reported in logs and the health endpoint.
    fn backend_name(&self) -> String;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it carries any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
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

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
    /// Extra attempts on 429/5xx. Zero means every call is single-shot.
    pub max_retries: u32,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    /// Makes a raw call, returning the full response object.
    /// Retries transient failures with exponential backoff when `max_retries > 0`.
    pub async fn call(&self, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let attempts = self.settings.max_retries + 1;
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        let last = last_error.unwrap_or(LlmError::EmptyContent);
        if attempts == 1 {
            return Err(last);
        }
        Err(LlmError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}", status);
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(chat)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn backend_name(&self) -> String {
        format!("openai-compatible ({})", self.settings.model)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LlmSettings {
        LlmSettings {
            api_key: "test".to_string(),
            api_base: "https://llm.internal/v1/".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_endpoint_joins_base_without_double_slash() {
        let client = LlmClient::new(settings()).unwrap();
        assert_eq!(client.endpoint(), "https://llm.internal/v1/chat/completions");
    }

    #[test]
    fn test_request_body_json_mode() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.3,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");

        let plain = ChatRequest {
            response_format: None,
            ..body
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn test_response_text_skips_blank_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), None);

        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Hello"}}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("Hello"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Api { status: 429, message: String::new() }.is_transient());
        assert!(LlmError::Api { status: 503, message: String::new() }.is_transient());
        assert!(!LlmError::Api { status: 400, message: String::new() }.is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }
}
