use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::llm_client::{gemini, groq, BackendKind, BackendSettings};
use crate::outreach::style::StyleSpec;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FROM_EMAIL: &str = "onboarding@resend.dev";
const DEFAULT_FROM_NAME: &str = "Internify";

/// Credentials for one backend, as read from the environment.
#[derive(Debug, Clone, Default)]
pub struct BackendEnv {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Transactional email provider settings. Absent when `RESEND_API_KEY` is unset.
#[derive(Clone)]
pub struct MailerConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
}

impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerConfig")
            .field("api_key", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup when no generation backend has credentials.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendSettings,
    pub llm_timeout: Duration,
    pub style_spec_path: Option<PathBuf>,
    pub mailer: Option<MailerConfig>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let groq = BackendEnv {
            api_key: optional_env("GROQ_API_KEY"),
            model: optional_env("GROQ_MODEL"),
            base_url: optional_env("GROQ_BASE_URL"),
        };
        let gemini = BackendEnv {
            api_key: optional_env("GEMINI_API_KEY"),
            model: optional_env("GEMINI_MODEL"),
            base_url: optional_env("GEMINI_BASE_URL"),
        };

        let llm_timeout = match optional_env("LLM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let mailer = optional_env("RESEND_API_KEY").map(|api_key| MailerConfig {
            api_key,
            from_email: optional_env("RESEND_FROM_EMAIL")
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            from_name: optional_env("RESEND_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
        });

        Ok(Config {
            backend: select_backend(groq, gemini)?,
            llm_timeout,
            style_spec_path: optional_env("STYLE_SPEC_PATH").map(PathBuf::from),
            mailer,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The style table from `STYLE_SPEC_PATH`, or the built-in one.
    pub fn load_style(&self) -> Result<StyleSpec> {
        match &self.style_spec_path {
            Some(path) => {
                let style = StyleSpec::from_json_file(path)?;
                info!("Loaded style spec from {}", path.display());
                Ok(style)
            }
            None => Ok(StyleSpec::default()),
        }
    }
}

/// Primary when its key is present, else secondary, else a fatal configuration error.
pub fn select_backend(groq: BackendEnv, gemini: BackendEnv) -> Result<BackendSettings> {
    if let Some(api_key) = groq.api_key {
        return Ok(BackendSettings {
            kind: BackendKind::Primary,
            api_key,
            model: groq.model.unwrap_or_else(|| groq::DEFAULT_MODEL.to_string()),
            base_url: groq
                .base_url
                .unwrap_or_else(|| groq::DEFAULT_BASE_URL.to_string()),
        });
    }

    if let Some(api_key) = gemini.api_key {
        return Ok(BackendSettings {
            kind: BackendKind::Secondary,
            api_key,
            model: gemini
                .model
                .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            base_url: gemini
                .base_url
                .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
        });
    }

    bail!("No LLM backend configured: set GROQ_API_KEY or GEMINI_API_KEY")
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
