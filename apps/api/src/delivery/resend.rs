//! Resend transactional email adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delivery::{format_html_body, DeliveryError, DeliveryReceipt, Mailer, OutboundEmail};

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

pub struct ResendMailer {
    client: Client,
    api_key: String,
    base_url: String,
    from_name: String,
    from_email: String,
}

impl ResendMailer {
    pub fn new(
        client: Client,
        api_key: String,
        base_url: String,
        from_name: String,
        from_email: String,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            from_name,
            from_email,
        }
    }

    fn build_request_body<'a>(
        &self,
        email: &'a OutboundEmail,
    ) -> Result<SendRequest<'a>, DeliveryError> {
        Ok(SendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: [email.to.as_str()],
            subject: &email.subject,
            html: format_html_body(&email.body)?,
            reply_to: email.reply_to.as_deref(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let body = self.build_request_body(email)?;

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendError>(&raw)
                .map(|e| e.message)
                .unwrap_or(raw);
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response.json().await?;
        debug!("Resend accepted message {}", sent.id);
        Ok(DeliveryReceipt { id: sent.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> ResendMailer {
        ResendMailer::new(
            Client::new(),
            "re_key".to_string(),
            "https://api.resend.com/".to_string(),
            "Internify".to_string(),
            "onboarding@resend.dev".to_string(),
        )
    }

    #[test]
    fn test_request_body_shape() {
        let email = OutboundEmail {
            to: "hr@acme.com".to_string(),
            subject: "Embedded Intern".to_string(),
            body: "Dear team,\nThanks.".to_string(),
            reply_to: Some("student@example.edu".to_string()),
        };
        let value = serde_json::to_value(mailer().build_request_body(&email).unwrap()).unwrap();

        assert_eq!(value["from"], "Internify <onboarding@resend.dev>");
        assert_eq!(value["to"][0], "hr@acme.com");
        assert_eq!(value["subject"], "Embedded Intern");
        assert_eq!(value["reply_to"], "student@example.edu");
        assert!(value["html"].as_str().unwrap().contains("Dear team,<br>"));
    }

    #[test]
    fn test_reply_to_omitted_when_absent() {
        let email = OutboundEmail {
            to: "hr@acme.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            reply_to: None,
        };
        let value = serde_json::to_value(mailer().build_request_body(&email).unwrap()).unwrap();
        assert!(value.get("reply_to").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(mailer().base_url, DEFAULT_BASE_URL);
    }
}
