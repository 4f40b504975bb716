//! Axum route handler for sending a generated email.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::AuthUser;
use crate::delivery::OutboundEmail;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct EmailSendRequest {
    /// Listing the email is about; persistence of the record happens downstream.
    #[serde(default)]
    pub internship_id: Option<String>,
    #[validate(email(message = "recipient_email is not a valid email address"))]
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct EmailSendResponse {
    pub success: bool,
    pub message: String,
    pub delivery_id: String,
}

/// POST /email/send
///
/// Sends an outreach email on behalf of the authenticated user, who becomes the reply-to.
pub async fn handle_send_email(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<EmailSendRequest>,
) -> Result<Json<EmailSendResponse>, AppError> {
    let mailer = state.mailer.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Email delivery is not configured".to_string())
    })?;

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if request.subject.trim().is_empty() {
        return Err(AppError::Validation("subject cannot be empty".to_string()));
    }
    if request.body.trim().is_empty() {
        return Err(AppError::Validation("body cannot be empty".to_string()));
    }

    let email = OutboundEmail {
        to: request.recipient_email.clone(),
        subject: request.subject.trim().to_string(),
        body: request.body,
        reply_to: Some(user.email.clone()),
    };

    let receipt = mailer.send(&email).await.map_err(|e| {
        warn!("Delivery failed for user {}: {e}", user.user_id);
        AppError::Delivery(e.to_string())
    })?;

    info!(
        "User {} sent outreach email {} (internship {:?})",
        user.user_id, receipt.id, request.internship_id
    );

    Ok(Json(EmailSendResponse {
        success: true,
        message: "Email sent successfully!".to_string(),
        delivery_id: receipt.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipient: &str) -> EmailSendRequest {
        EmailSendRequest {
            internship_id: None,
            recipient_email: recipient.to_string(),
            subject: "Embedded Intern".to_string(),
            body: "Dear team,".to_string(),
        }
    }

    #[test]
    fn test_valid_recipients_accepted() {
        for good in ["hr@acme.com", "first.last+jobs@mail.example.org"] {
            assert!(request(good).validate().is_ok(), "{good} should be accepted");
        }
    }

    #[test]
    fn test_invalid_recipients_rejected() {
        for bad in ["", "acme.com", "@acme.com", "hr@", "hr@@acme.com", "h r@acme.com"] {
            assert!(request(bad).validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_rejection_names_the_field() {
        let err = request("not-an-address").validate().unwrap_err();
        assert!(err.field_errors().contains_key("recipient_email"));
    }
}
