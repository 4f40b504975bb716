//! Outreach generation: orchestrates the full email pipeline.
//!
//! Flow: sanitize → build prompt → backend (bounded by timeout) → validate →
//!       accept, or fall back to the template generator.
//!
//! Backend failures and generic output never reach the caller as errors; only a failure of
//! the fallback itself yields `success = false`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::llm_client::prompts::system_prompt;
use crate::llm_client::{BackendKind, BackendRequest, GenerationBackend, LlmError};
use crate::outreach::fallback::{FallbackComposer, TemplateFallback};
use crate::outreach::prompts::{build_outreach_prompt, GenerationRequest};
use crate::outreach::style::StyleSpec;
use crate::outreach::subject::{IndexPicker, SubjectLineGenerator, ThreadRngPicker};
use crate::outreach::validator::validate_output;

/// Characters of prompt text shown in debug logs.
const LOG_PREVIEW_CHARS: usize = 120;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// States a generation request moves through. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Start,
    PromptBuilt,
    BackendAttempted,
    Validated,
    FallbackInvoked,
    Done,
    Failed,
}

/// Why the template fallback produced the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Network/provider error, timeout, block, or empty response.
    BackendFailed(String),
    /// The validator judged the backend's text too generic.
    Rejected(Vec<String>),
}

/// Where the returned body came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum EmailSource {
    Backend { backend: BackendKind },
    Fallback { reason: FallbackReason },
    /// Fallback itself failed; the body is empty.
    Unavailable,
}

/// Result of `generate_email`.
#[derive(Debug, Clone, Serialize)]
pub struct EmailOutcome {
    pub body: String,
    pub success: bool,
    pub source: EmailSource,
    /// Every stage visited, in order, starting with `Start`.
    pub path: Vec<GenerationStage>,
}

/// A finished email: body plus subject line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

/// Process-wide email generation service. Built once at startup, shared read-only.
pub struct EmailService {
    backend: Arc<dyn GenerationBackend>,
    fallback: Arc<dyn FallbackComposer>,
    subjects: SubjectLineGenerator,
    style: Arc<StyleSpec>,
    timeout: Duration,
}

impl EmailService {
    /// Production wiring: template fallback and thread-RNG subject selection.
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        style: Arc<StyleSpec>,
        timeout: Duration,
    ) -> Self {
        let fallback = Arc::new(TemplateFallback::new(&style));
        Self::with_parts(backend, fallback, Box::new(ThreadRngPicker), style, timeout)
    }

    /// Full dependency injection, used by tests and alternative deployments.
    pub fn with_parts(
        backend: Arc<dyn GenerationBackend>,
        fallback: Arc<dyn FallbackComposer>,
        picker: Box<dyn IndexPicker>,
        style: Arc<StyleSpec>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            fallback,
            subjects: SubjectLineGenerator::new(&style, picker),
            style,
            timeout,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend_model(&self) -> &str {
        self.backend.model()
    }

    /// Generates an outreach email body. Never fails for input reasons; empty fields
    /// degrade to placeholders.
    pub async fn generate_email(&self, request: &GenerationRequest) -> EmailOutcome {
        let mut path = vec![GenerationStage::Start];

        let request = request.sanitized(&self.style);
        let prompt = build_outreach_prompt(&request, &self.style);
        let system = system_prompt(&self.style.system_instruction);
        advance(&mut path, GenerationStage::PromptBuilt);
        debug!(
            "Outreach prompt built ({} chars): {:?}",
            prompt.chars().count(),
            prompt.chars().take(LOG_PREVIEW_CHARS).collect::<String>()
        );

        let backend_request = BackendRequest {
            system: &system,
            prompt: &prompt,
            temperature: self.style.temperature,
            max_output_tokens: self.style.max_output_tokens,
        };
        let attempt = self.call_backend(&backend_request).await;
        advance(&mut path, GenerationStage::BackendAttempted);

        let reason = match attempt {
            Ok(text) => {
                let verdict = validate_output(&text, &self.style);
                advance(&mut path, GenerationStage::Validated);
                if verdict.accepted() {
                    advance(&mut path, GenerationStage::Done);
                    info!(
                        "Outreach email generated by {} backend for role {:?}",
                        self.backend.kind(),
                        request.role_or_placeholder()
                    );
                    return EmailOutcome {
                        body: text,
                        success: true,
                        source: EmailSource::Backend {
                            backend: self.backend.kind(),
                        },
                        path,
                    };
                }
                warn!(
                    "Backend output rejected as generic: {}",
                    verdict.reasons.join("; ")
                );
                FallbackReason::Rejected(verdict.reasons)
            }
            Err(e) => {
                warn!("{} backend failed, using template fallback: {e}", self.backend.kind());
                FallbackReason::BackendFailed(e.to_string())
            }
        };

        advance(&mut path, GenerationStage::FallbackInvoked);
        match self.fallback.compose(&request) {
            Ok(body) => {
                advance(&mut path, GenerationStage::Done);
                EmailOutcome {
                    body,
                    success: true,
                    source: EmailSource::Fallback { reason },
                    path,
                }
            }
            Err(e) => {
                warn!("Template fallback failed: {e}");
                advance(&mut path, GenerationStage::Failed);
                EmailOutcome {
                    body: String::new(),
                    success: false,
                    source: EmailSource::Unavailable,
                    path,
                }
            }
        }
    }

    /// Picks a subject line for the role/company pair. Inputs are truncated to the
    /// style's title and company limits.
    pub fn generate_subject_line(&self, role_title: &str, company_name: &str) -> String {
        self.subjects.generate(role_title, company_name)
    }

    /// Every subject `generate_subject_line` could return for these inputs.
    #[cfg(test)]
    pub fn subject_candidates(&self, role_title: &str, company_name: &str) -> Vec<String> {
        self.subjects.candidates(role_title, company_name)
    }

    /// Calls the backend under the configured timeout.
    async fn call_backend(&self, request: &BackendRequest<'_>) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.backend.generate(request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(LlmError::EmptyContent),
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

/// Records a stage transition.
fn advance(path: &mut Vec<GenerationStage>, next: GenerationStage) {
    if let Some(previous) = path.last() {
        debug!("Outreach pipeline: {previous:?} -> {next:?}");
    }
    path.push(next);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::outreach::fallback::FallbackError;
    use crate::outreach::subject::FixedPicker;

    enum Reply {
        Text(String),
        Fail,
        Hang,
    }

    struct FakeBackend {
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Primary
        }

        fn model(&self) -> &str {
            "fake"
        }

        async fn generate(&self, request: &BackendRequest<'_>) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            match &self.reply {
                Reply::Text(t) => Ok(t.clone()),
                Reply::Fail => Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                }),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            }
        }
    }

    struct BrokenFallback;

    impl FallbackComposer for BrokenFallback {
        fn compose(&self, _request: &GenerationRequest) -> Result<String, FallbackError> {
            Err(FallbackError::EmptyBody)
        }
    }

    fn service(backend: Arc<FakeBackend>) -> EmailService {
        EmailService::new(backend, Arc::new(StyleSpec::default()), Duration::from_secs(5))
    }

    /// 130 specific words without banned phrases.
    fn good_body() -> String {
        "Your sensor roadmap caught my eye because SmartSense ran on STM32 boards for months. "
            .repeat(10)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "Built SmartSense using STM32 and FreeRTOS",
            "Firmware internship",
            "Embedded Intern",
            "Acme",
        )
    }

    #[tokio::test]
    async fn test_accepted_backend_output_is_returned() {
        let backend = FakeBackend::new(Reply::Text(good_body()));
        let outcome = service(backend).generate_email(&request()).await;

        assert!(outcome.success);
        assert_eq!(outcome.body, good_body());
        assert_eq!(
            outcome.source,
            EmailSource::Backend {
                backend: BackendKind::Primary
            }
        );
        assert_eq!(
            outcome.path,
            vec![
                GenerationStage::Start,
                GenerationStage::PromptBuilt,
                GenerationStage::BackendAttempted,
                GenerationStage::Validated,
                GenerationStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_generic_output_falls_back() {
        let generic = "I have experience in many things. I am passionate about various projects.";
        let backend = FakeBackend::new(Reply::Text(generic.to_string()));
        let outcome = service(backend).generate_email(&request()).await;

        assert!(outcome.success);
        assert!(outcome.body.contains("SmartSense"));
        assert!(matches!(
            outcome.source,
            EmailSource::Fallback {
                reason: FallbackReason::Rejected(_)
            }
        ));
        assert_eq!(
            outcome.path,
            vec![
                GenerationStage::Start,
                GenerationStage::PromptBuilt,
                GenerationStage::BackendAttempted,
                GenerationStage::Validated,
                GenerationStage::FallbackInvoked,
                GenerationStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_backend_error_falls_back() {
        let outcome = service(FakeBackend::new(Reply::Fail))
            .generate_email(&request())
            .await;

        assert!(outcome.success);
        assert!(!outcome.body.is_empty());
        match outcome.source {
            EmailSource::Fallback {
                reason: FallbackReason::BackendFailed(msg),
            } => assert!(msg.contains("503")),
            other => panic!("unexpected source {other:?}"),
        }
        assert!(!outcome.path.contains(&GenerationStage::Validated));
    }

    #[tokio::test]
    async fn test_empty_backend_output_falls_back() {
        let outcome = service(FakeBackend::new(Reply::Text("   \n".to_string())))
            .generate_email(&request())
            .await;

        assert!(outcome.success);
        assert!(matches!(
            outcome.source,
            EmailSource::Fallback {
                reason: FallbackReason::BackendFailed(_)
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_times_out_into_fallback() {
        let svc = EmailService::new(
            FakeBackend::new(Reply::Hang),
            Arc::new(StyleSpec::default()),
            Duration::from_millis(50),
        );
        let outcome = svc.generate_email(&request()).await;

        assert!(outcome.success);
        match outcome.source {
            EmailSource::Fallback {
                reason: FallbackReason::BackendFailed(msg),
            } => assert!(msg.contains("timed out")),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fallback_failure_is_reported() {
        let style = Arc::new(StyleSpec::default());
        let svc = EmailService::with_parts(
            FakeBackend::new(Reply::Fail),
            Arc::new(BrokenFallback),
            Box::new(FixedPicker(0)),
            style,
            Duration::from_secs(5),
        );
        let outcome = svc.generate_email(&request()).await;

        assert!(!outcome.success);
        assert!(outcome.body.is_empty());
        assert_eq!(outcome.source, EmailSource::Unavailable);
        assert_eq!(outcome.path.last(), Some(&GenerationStage::Failed));
    }

    #[tokio::test]
    async fn test_resume_truncated_exactly_in_backend_prompt() {
        let style = StyleSpec::default();
        let backend = FakeBackend::new(Reply::Text(good_body()));
        let svc = service(backend.clone());

        let kept = "x".repeat(style.max_resume_chars);
        let resume = format!("{kept}ZZZZ");
        svc.generate_email(&GenerationRequest::new(resume, "", "Intern", "Acme"))
            .await;

        let prompt = backend.last_prompt();
        assert!(prompt.contains(&format!("{kept}\n")));
        assert!(!prompt.contains(&"x".repeat(style.max_resume_chars + 1)));
        assert!(!prompt.contains("ZZZZ"));
    }

    #[tokio::test]
    async fn test_empty_inputs_still_produce_body() {
        for reply in [Reply::Fail, Reply::Text(String::new())] {
            let outcome = service(FakeBackend::new(reply))
                .generate_email(&GenerationRequest::default())
                .await;
            assert!(outcome.success);
            assert!(!outcome.body.trim().is_empty());
        }
    }

    #[test]
    fn test_advance_appends_stage() {
        let mut path = vec![GenerationStage::Start];
        advance(&mut path, GenerationStage::PromptBuilt);
        advance(&mut path, GenerationStage::BackendAttempted);
        assert_eq!(
            path,
            vec![
                GenerationStage::Start,
                GenerationStage::PromptBuilt,
                GenerationStage::BackendAttempted,
            ]
        );
    }

    #[test]
    fn test_subject_line_bounded_by_title_limit() {
        let style = StyleSpec::default();
        let svc = service(FakeBackend::new(Reply::Fail));
        let subject = svc.generate_subject_line(&"T".repeat(5000), "Acme");

        let title_run = subject.chars().filter(|c| *c == 'T').count();
        assert_eq!(title_run, style.max_title_chars);
        assert!(subject.chars().count() < style.max_title_chars + 60);
    }

    #[test]
    fn test_subject_line_contains_inputs() {
        let svc = service(FakeBackend::new(Reply::Fail));
        for _ in 0..20 {
            let subject = svc.generate_subject_line("Data Intern", "Globex");
            assert!(svc
                .subject_candidates("Data Intern", "Globex")
                .contains(&subject));
            assert!(subject.contains("Data Intern") || subject.contains("Globex"));
        }
    }

    #[test]
    fn test_outcome_source_serialization() {
        let source = EmailSource::Fallback {
            reason: FallbackReason::BackendFailed("boom".to_string()),
        };
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["origin"], "fallback");
        assert_eq!(value["reason"]["kind"], "backend_failed");
        assert_eq!(value["reason"]["detail"], "boom");
    }
}
