use std::sync::Arc;

use crate::delivery::Mailer;
use crate::outreach::generator::EmailService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Outreach pipeline bound to the backend chosen at startup.
    pub email_service: Arc<EmailService>,
    /// `None` when no email provider is configured; `/email/send` then answers 503.
    pub mailer: Option<Arc<dyn Mailer>>,
}
