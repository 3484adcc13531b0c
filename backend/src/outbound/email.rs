//! Email adapters.
//!
//! [`EmailJsSender`] posts templated messages to an EmailJS-compatible HTTP
//! API. [`LoggingEmailSender`] records messages in the log when no provider
//! is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::info;

use crate::domain::ports::{EmailMessage, EmailSendError, EmailSender, EmailTemplate};

const BODY_PREVIEW_LIMIT: usize = 200;

/// Provider account and template identifiers.
#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub endpoint: Url,
    pub service_id: String,
    pub public_key: String,
    pub access_token: Option<String>,
    pub password_reset_template: String,
    pub event_announcement_template: String,
}

impl EmailJsConfig {
    fn template_id(&self, template: EmailTemplate) -> &str {
        match template {
            EmailTemplate::PasswordReset => &self.password_reset_template,
            EmailTemplate::EventAnnouncement => &self.event_announcement_template,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: serde_json::Map<String, serde_json::Value>,
}

fn build_request<'a>(config: &'a EmailJsConfig, message: &EmailMessage) -> SendRequest<'a> {
    let mut template_params = serde_json::Map::new();
    template_params.insert("to_email".to_owned(), message.to_email.clone().into());
    template_params.insert("to_name".to_owned(), message.to_name.clone().into());
    for (key, value) in &message.params {
        template_params.insert(key.clone(), value.clone().into());
    }
    SendRequest {
        service_id: &config.service_id,
        template_id: config.template_id(message.template),
        user_id: &config.public_key,
        access_token: config.access_token.as_deref(),
        template_params,
    }
}

/// HTTP email sender.
pub struct EmailJsSender {
    client: Client,
    config: EmailJsConfig,
}

impl EmailJsSender {
    /// Build a sender whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: EmailJsConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSender for EmailJsSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        let request = build_request(&self.config, message);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| EmailSendError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> EmailSendError {
    let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
    EmailSendError::rejected(status.as_u16(), preview.trim())
}

/// Sender that only logs; used in development.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        info!(
            template = ?message.template,
            to = %message.to_email,
            params = ?message.params.keys().collect::<Vec<_>>(),
            "email delivery skipped: no provider configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EmailJsConfig {
        EmailJsConfig {
            endpoint: Url::parse("https://api.emailjs.test/api/v1.0/email/send")
                .expect("valid url"),
            service_id: "service_alumni".into(),
            public_key: "public-key".into(),
            access_token: Some("private-token".into()),
            password_reset_template: "template_reset".into(),
            event_announcement_template: "template_event".into(),
        }
    }

    #[test]
    fn request_body_uses_provider_field_names() {
        let message = EmailMessage::new(EmailTemplate::PasswordReset, "ana@example.com", "Ana")
            .with_param("reset_link", "https://alumni.test/reset?token=abc");
        let config = config();
        let body = serde_json::to_value(build_request(&config, &message)).expect("serialise");
        assert_eq!(
            body,
            json!({
                "service_id": "service_alumni",
                "template_id": "template_reset",
                "user_id": "public-key",
                "accessToken": "private-token",
                "template_params": {
                    "to_email": "ana@example.com",
                    "to_name": "Ana",
                    "reset_link": "https://alumni.test/reset?token=abc"
                }
            })
        );
    }

    #[test]
    fn event_template_is_selected_per_message() {
        let message = EmailMessage::new(EmailTemplate::EventAnnouncement, "a@b.c", "A");
        let config = config();
        assert_eq!(build_request(&config, &message).template_id, "template_event");
    }

    #[test]
    fn rejected_status_keeps_short_preview() {
        let err = map_status_error(StatusCode::BAD_REQUEST, &"x".repeat(500));
        match err {
            EmailSendError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.len(), BODY_PREVIEW_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn logging_sender_always_succeeds() {
        let message = EmailMessage::new(EmailTemplate::PasswordReset, "a@b.c", "A");
        LoggingEmailSender.send(&message).await.expect("logged");
    }
}
