//! Template Fallback Generator: the terminal, network-free path.
//!
//! Used when the backend errors, times out, returns nothing, or its output is rejected by the
//! validator. Builds a fixed-shape email from an `ExtractedProfile`, substituting generic
//! placeholders for anything extraction could not find.

use thiserror::Error;

use crate::outreach::profile::{Domain, ExtractedProfile};
use crate::outreach::prompts::GenerationRequest;
use crate::outreach::style::StyleSpec;

pub const PROJECT_PLACEHOLDER: &str = "a specialized project";
pub const TECHNOLOGY_PLACEHOLDER: &str = "modern technologies";
const SIGN_OFF: &str = "Best regards";
/// Technologies named in the proof paragraph; the rest go into a follow-up sentence.
const HEADLINE_TECHNOLOGIES: usize = 3;

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("fallback template rendered an empty body")]
    EmptyBody,
}

/// Produces a substitute email body without any external dependency.
pub trait FallbackComposer: Send + Sync {
    fn compose(&self, request: &GenerationRequest) -> Result<String, FallbackError>;
}

/// Default composer: keyword/entity extraction + a fixed multi-paragraph template.
#[derive(Debug, Clone)]
pub struct TemplateFallback {
    closing_sentence: String,
}

impl TemplateFallback {
    pub fn new(style: &StyleSpec) -> Self {
        Self {
            closing_sentence: style.closing_sentence.clone(),
        }
    }
}

impl FallbackComposer for TemplateFallback {
    fn compose(&self, request: &GenerationRequest) -> Result<String, FallbackError> {
        let profile = ExtractedProfile::extract(&request.resume_text, &request.role_title);
        let body = render_fallback_email(request, &profile, &self.closing_sentence);

        if body.trim().is_empty() {
            return Err(FallbackError::EmptyBody);
        }
        Ok(body)
    }
}

/// Domain-specific wording: (what the role centres on, what the candidate cares about).
fn domain_phrases(domain: Domain) -> (&'static str, &'static str) {
    match domain {
        Domain::Ai => (
            "applied AI",
            "turning machine learning models into tools that people actually rely on",
        ),
        Domain::Embedded => (
            "embedded systems",
            "writing firmware that has to behave correctly on constrained hardware",
        ),
        Domain::Data => (
            "data and analytics",
            "turning messy raw data into analysis that drives real decisions",
        ),
        Domain::Backend => (
            "backend engineering",
            "building services and APIs that stay reliable under real traffic",
        ),
        Domain::Frontend => (
            "frontend development",
            "building interfaces that feel fast and are easy to use",
        ),
        Domain::Fullstack => (
            "full-stack development",
            "shipping features end to end, from the database up to the interface",
        ),
        Domain::Generic => (
            "the problems your team is solving",
            "picking up new tools quickly and delivering work that holds up",
        ),
    }
}

/// Assembles the fallback email. Always returns a complete template.
pub fn render_fallback_email(
    request: &GenerationRequest,
    profile: &ExtractedProfile,
    closing_sentence: &str,
) -> String {
    let role = request.role_or_placeholder();
    let company = request.company_or_placeholder();
    let (focus, motivation) = domain_phrases(profile.domain);

    let greeting = if request.company_name.trim().is_empty() {
        "Dear Hiring Team,".to_string()
    } else {
        format!("Dear {company} Hiring Team,")
    };

    let opening = format!(
        "Your posting for {role} at {company} caught my attention because it centres on {focus}. \
         That is the area I have spent most of my time on as a student, and it is where I want \
         to keep growing."
    );

    let project = profile.project_name.as_deref().unwrap_or(PROJECT_PLACEHOLDER);
    let headline: Vec<&str> = profile
        .technologies
        .iter()
        .take(HEADLINE_TECHNOLOGIES)
        .map(String::as_str)
        .collect();
    let technologies = if headline.is_empty() {
        TECHNOLOGY_PLACEHOLDER.to_string()
    } else {
        join_with_and(&headline)
    };

    let mut proof = format!(
        "Most recently I built {project} with {technologies}. I owned it from the first design \
         sketch to a working version, which taught me how to debug under pressure and how to \
         make trade-offs that keep a project moving."
    );
    let extra: Vec<&str> = profile
        .technologies
        .iter()
        .skip(HEADLINE_TECHNOLOGIES)
        .take(HEADLINE_TECHNOLOGIES)
        .map(String::as_str)
        .collect();
    if !extra.is_empty() {
        proof.push_str(&format!(" I am also comfortable with {}.", join_with_and(&extra)));
    }

    let fit = format!(
        "I care about {motivation}, and I would bring that same focus to {company} from day one."
    );

    let call_to_action = format!(
        "Would you be open to a 15-minute call in the next week or two to talk about how I could \
         contribute to {company}? {closing_sentence}"
    );

    [
        greeting,
        opening,
        proof,
        fit,
        call_to_action,
        SIGN_OFF.to_string(),
    ]
    .join("\n\n")
}

/// "A", "A and B", "A, B, and C".
fn join_with_and(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
