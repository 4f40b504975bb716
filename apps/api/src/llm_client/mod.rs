/// Generation Backend Adapter: the single point of entry for all LLM calls.
///
/// ARCHITECTURAL RULE: No other module may call a generation provider directly.
/// Exactly one backend variant is active per process, chosen once at startup:
/// Primary (Groq, OpenAI-compatible chat completions) when its key is configured,
/// otherwise Secondary (Gemini generateContent).
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

pub mod gemini;
pub mod groq;
pub mod prompts;

pub use gemini::GeminiBackend;
pub use groq::GroqBackend;

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

    #[error("LLM response blocked: {0}")]
    Blocked(String),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
}

/// Which backend variant is serving this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Primary,
    Secondary,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Primary => write!(f, "primary (groq)"),
            BackendKind::Secondary => write!(f, "secondary (gemini)"),
        }
    }
}

/// Credentials and endpoint for the selected backend.
#[derive(Clone)]
pub struct BackendSettings {
    pub kind: BackendKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Provider-agnostic generation call.
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Shared contract of every backend variant.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn model(&self) -> &str;

    /// Returns cleaned, non-empty text or an error. Never retries.
    async fn generate(&self, request: &BackendRequest<'_>) -> Result<String, LlmError>;
}

/// Builds the backend described by `settings`. `timeout` bounds each HTTP call.
pub fn build_backend(
    settings: &BackendSettings,
    timeout: Duration,
) -> Result<Arc<dyn GenerationBackend>, LlmError> {
    let client = Client::builder().timeout(timeout).build()?;

    let backend: Arc<dyn GenerationBackend> = match settings.kind {
        BackendKind::Primary => Arc::new(GroqBackend::new(
            client,
            settings.api_key.clone(),
            settings.base_url.clone(),
            settings.model.clone(),
        )),
        BackendKind::Secondary => Arc::new(GeminiBackend::new(
            client,
            settings.api_key.clone(),
            settings.base_url.clone(),
            settings.model.clone(),
        )),
    };
    Ok(backend)
}

/// Normalises raw model output into an email body:
/// strips markdown code fences and a leading "Subject:" line the model may add anyway.
pub fn clean_completion(text: &str) -> String {
    let text = strip_code_fences(text.trim());

    let body = match text.split_once('\n') {
        Some((first, rest)) if first.trim_start().to_lowercase().starts_with("subject:") => rest,
        None if text.trim_start().to_lowercase().starts_with("subject:") => "",
        _ => text,
    };
    body.trim().to_string()
}

/// Strips ```text ... ``` or ``` ... ``` code fences from LLM output.
fn strip_code_fences(text: &str) -> &str {
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as "text" or "markdown" on the opening fence line.
    let stripped = match stripped.split_once('\n') {
        Some((info, rest)) if !info.trim().contains(' ') => rest,
        _ => stripped,
    };
    stripped
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(stripped)
        .trim()
}

/// Reads the error body of a non-success response, preferring the provider's
/// `{"error": {"message": ...}}` shape when present.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_completion_plain_text() {
        assert_eq!(clean_completion("  Hello there.\n\nBye.  "), "Hello there.\n\nBye.");
    }

    #[test]
    fn test_clean_completion_strips_fences_with_tag() {
        let input = "```text\nDear team,\n\nThanks.\n```";
        assert_eq!(clean_completion(input), "Dear team,\n\nThanks.");
    }

    #[test]
    fn test_clean_completion_strips_fences_without_tag() {
        let input = "```\nDear team,\n```";
        assert_eq!(clean_completion(input), "Dear team,");
    }

    #[test]
    fn test_clean_completion_drops_subject_line() {
        let input = "Subject: Embedded Intern\n\nDear team,\nThanks.";
        assert_eq!(clean_completion(input), "Dear team,\nThanks.");
    }

    #[test]
    fn test_clean_completion_subject_only_is_empty() {
        assert_eq!(clean_completion("SUBJECT: nothing else"), "");
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Primary.to_string(), "primary (groq)");
        assert_eq!(BackendKind::Secondary.to_string(), "secondary (gemini)");
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = BackendSettings {
            kind: BackendKind::Primary,
            api_key: "gsk_secret".to_string(),
            model: "m".to_string(),
            base_url: "http://localhost".to_string(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_build_backend_selects_variant() {
        let mut settings = BackendSettings {
            kind: BackendKind::Primary,
            api_key: "k".to_string(),
            model: "llama".to_string(),
            base_url: "http://localhost".to_string(),
        };
        let backend = build_backend(&settings, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Primary);
        assert_eq!(backend.model(), "llama");

        settings.kind = BackendKind::Secondary;
        let backend = build_backend(&settings, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Secondary);
    }
}
