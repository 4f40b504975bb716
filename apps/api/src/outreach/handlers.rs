//! Axum route handlers for the outreach generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::outreach::generator::{EmailSource, GeneratedEmail};
use crate::outreach::prompts::GenerationRequest;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Missing fields deserialize as empty strings; generation degrades to placeholders.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailGenerateRequest {
    pub resume_text: String,
    #[serde(alias = "job_description")]
    pub internship_description: String,
    #[serde(alias = "job_title")]
    pub internship_title: String,
    pub company_name: String,
}

impl From<EmailGenerateRequest> for GenerationRequest {
    fn from(req: EmailGenerateRequest) -> Self {
        GenerationRequest {
            resume_text: req.resume_text,
            role_description: req.internship_description,
            role_title: req.internship_title,
            company_name: req.company_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmailGenerateResponse {
    #[serde(flatten)]
    pub email: GeneratedEmail,
    pub success: bool,
    pub source: EmailSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /llm/generate-email
///
/// Generates a subject and body for a cold outreach email. Backend failures and generic
/// output are absorbed by the template fallback; only a fallback failure returns 500.
pub async fn handle_generate_email(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<EmailGenerateRequest>,
) -> Result<Json<EmailGenerateResponse>, AppError> {
    let request = GenerationRequest::from(request);

    let outcome = state.email_service.generate_email(&request).await;
    if !outcome.success {
        return Err(AppError::Llm(
            "Failed to generate email. Please try again.".to_string(),
        ));
    }

    let subject = state
        .email_service
        .generate_subject_line(&request.role_title, &request.company_name);

    info!(
        "Generated outreach email for user {} ({:?})",
        user.user_id, outcome.source
    );

    Ok(Json(EmailGenerateResponse {
        email: GeneratedEmail {
            subject,
            body: outcome.body,
        },
        success: true,
        source: outcome.source,
    }))
}

/// POST /llm/regenerate-email
///
/// Same pipeline as generate-email; a fresh backend call and a freshly drawn subject.
pub async fn handle_regenerate_email(
    state: State<AppState>,
    user: AuthUser,
    request: Json<EmailGenerateRequest>,
) -> Result<Json<EmailGenerateResponse>, AppError> {
    handle_generate_email(state, user, request).await
}
