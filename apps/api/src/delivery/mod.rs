//! Email delivery through a transactional email provider.
//!
//! Delivery is an external collaborator: this module only shapes the message and hands it
//! to a `Mailer`. The default `Mailer` is the Resend HTTP API.

use askama::Template;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod handlers;
pub mod resend;

pub use resend::ResendMailer;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to render email body: {0}")]
    Render(#[from] askama::Error),
}

/// A message ready to hand to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    /// Plain text or HTML; see `format_html_body`.
    pub body: String,
    pub reply_to: Option<String>,
}

/// Provider confirmation of an accepted message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReceipt {
    pub id: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError>;
}

/// The HTML document sent to recipients. Rendered from `templates/email.html`.
#[derive(Template)]
#[template(path = "email.html")]
struct EmailDocument<'a> {
    /// Set when the body is already HTML; inserted unescaped.
    html: Option<&'a str>,
    /// Plain-text lines, escaped and joined with `<br>`.
    lines: Vec<&'a str>,
}

/// Wraps a body in the HTML document sent to recipients.
/// Bodies that already start with `<` are treated as HTML; anything else is escaped and
/// its newlines become `<br>`.
pub fn format_html_body(body: &str) -> Result<String, DeliveryError> {
    let document = if body.trim_start().starts_with('<') {
        EmailDocument {
            html: Some(body),
            lines: Vec::new(),
        }
    } else {
        EmailDocument {
            html: None,
            lines: body.lines().collect(),
        }
    };
    Ok(document.render()?)
}
