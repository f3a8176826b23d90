use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::Config, constants::quiz_prompt::QUIZ_SYSTEM_PROMPT, models::dto::generation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("the generation service rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("the generation service failed: {0}")]
    Service(String),

    #[error("the generation service returned no content")]
    EmptyResponse,
}

impl CompletionError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, CompletionError::Unauthorized(_))
    }
}

/// Sends one prompt to the text-generation service and returns its raw text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

/// Chat-completions client for any OpenAI-compatible endpoint; the default
/// configuration points at Gemini's compatibility layer.
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompletionClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret().to_string())
            .with_api_base(config.api_base.clone());

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: QUIZ_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "quiz",
                    "strict": true,
                    "schema": generation::quiz_payload_schema(),
                }
            }),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        log::debug!("Sending quiz prompt to model {}", self.model);

        let response: ChatResponse = self
            .client
            .chat()
            .create_byot(self.request(prompt))
            .await
            .map_err(classify_error)?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

fn classify_error(err: OpenAIError) -> CompletionError {
    if let OpenAIError::ApiError(api_error) = &err {
        if looks_like_auth_failure(&api_error.message) {
            return CompletionError::Unauthorized(api_error.message.clone());
        }
    }
    CompletionError::Service(err.to_string())
}

fn looks_like_auth_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    ["api key", "api_key", "unauthorized", "permission denied", "unauthenticated"]
        .iter()
        .any(|needle| message.contains(needle))
}
