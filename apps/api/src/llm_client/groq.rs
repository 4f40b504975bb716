//! Primary backend: Groq's OpenAI-compatible chat completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{
    api_error, clean_completion, BackendKind, BackendRequest, GenerationBackend, LlmError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct GroqBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqBackend {
    pub fn new(client: Client, api_key: String, base_url: String, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn build_request_body<'a>(&'a self, request: &BackendRequest<'a>) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }
}

/// Extracts the first choice's text. A `content_filter` finish reason counts as blocked.
pub(crate) fn parse_chat_response(response: &ChatResponse) -> Result<String, LlmError> {
    let choice = response.choices.first().ok_or(LlmError::EmptyContent)?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(LlmError::Blocked("content_filter".to_string()));
    }

    let text = choice
        .message
        .content
        .as_deref()
        .map(clean_completion)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text)
}

#[async_trait]
impl GenerationBackend for GroqBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Primary
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &BackendRequest<'_>) -> Result<String, LlmError> {
        let body = self.build_request_body(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "Groq call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        parse_chat_response(&chat)
    }
}
