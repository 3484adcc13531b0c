//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ALUMNI_*` environment variables and the
//! optional configuration file, in that order of precedence. Session cookie
//! settings are loaded separately; see
//! [`crate::inbound::http::session_config`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::AdminSeed;
use crate::outbound::email::EmailJsConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
const DEFAULT_RESET_URL: &str = "http://localhost:3000/reset-password";
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid email endpoint '{value}': {source}")]
    EmailEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("incomplete email settings: {missing} is required when {present} is set")]
    IncompleteEmail {
        missing: &'static str,
        present: &'static str,
    },
    #[error("bootstrap admin requires name, email and password together")]
    IncompleteAdmin,
}

/// Runtime configuration for the server and CLI tools.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ALUMNI")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Comma-separated origins allowed to open `/ws`.
    pub ws_allowed_origins: Option<String>,
    /// EmailJS-compatible send endpoint.
    pub email_endpoint: Option<String>,
    pub email_service_id: Option<String>,
    pub email_public_key: Option<String>,
    pub email_access_token: Option<String>,
    pub email_reset_template: Option<String>,
    pub email_announcement_template: Option<String>,
    /// Request timeout for the email provider, in seconds.
    pub email_timeout_secs: Option<u64>,
    /// Page that receives `?token=` in password reset emails.
    pub password_reset_url: Option<String>,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Database URL, treating a blank value as absent.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.ws_allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn password_reset_url(&self) -> &str {
        self.password_reset_url.as_deref().unwrap_or(DEFAULT_RESET_URL)
    }

    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs.unwrap_or(DEFAULT_EMAIL_TIMEOUT_SECS))
    }

    /// Provider settings, or `None` when no service id is configured.
    ///
    /// # Errors
    /// Fails when the service id is set but other required values are
    /// missing or the endpoint is not a URL.
    pub fn email_config(&self) -> Result<Option<EmailJsConfig>, SettingsError> {
        let Some(service_id) = self.email_service_id.clone() else {
            return Ok(None);
        };
        let required = |value: &Option<String>, missing: &'static str| {
            value.clone().ok_or(SettingsError::IncompleteEmail {
                missing,
                present: "email_service_id",
            })
        };
        let public_key = required(&self.email_public_key, "email_public_key")?;
        let password_reset_template = required(&self.email_reset_template, "email_reset_template")?;
        let event_announcement_template =
            required(&self.email_announcement_template, "email_announcement_template")?;
        let raw_endpoint = self
            .email_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_EMAIL_ENDPOINT);
        let endpoint = Url::parse(raw_endpoint).map_err(|source| SettingsError::EmailEndpoint {
            value: raw_endpoint.to_owned(),
            source,
        })?;
        Ok(Some(EmailJsConfig {
            endpoint,
            service_id,
            public_key,
            access_token: self.email_access_token.clone(),
            password_reset_template,
            event_announcement_template,
        }))
    }

    /// Bootstrap administrator, when all three values are present.
    ///
    /// # Errors
    /// Fails when only some of the admin values are set.
    pub fn admin_seed(&self) -> Result<Option<AdminSeed>, SettingsError> {
        match (&self.admin_name, &self.admin_email, &self.admin_password) {
            (Some(name), Some(email), Some(password)) => Ok(Some(AdminSeed {
                name: name.clone(),
                email: email.clone(),
                password: password.clone(),
            })),
            (None, None, None) => Ok(None),
            _ => Err(SettingsError::IncompleteAdmin),
        }
    }
}
