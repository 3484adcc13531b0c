//! Port for transactional email dispatch.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by email adapters.
    pub enum EmailSendError {
        /// The email API could not be reached.
        Transport { message: String } => "email transport failed: {message}",
        /// The email API rejected the request.
        Rejected { status: u16, message: String } =>
            "email API rejected request with status {status}: {message}",
    }
}

/// Templates configured at the email provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailTemplate {
    PasswordReset,
    EventAnnouncement,
}

/// A templated message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub template: EmailTemplate,
    pub to_email: String,
    pub to_name: String,
    pub params: BTreeMap<String, String>,
}

impl EmailMessage {
    #[must_use]
    pub fn new(template: EmailTemplate, to_email: &str, to_name: &str) -> Self {
        Self {
            template,
            to_email: to_email.to_owned(),
            to_name: to_name.to_owned(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }
}

/// Outbound email delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError>;
}
