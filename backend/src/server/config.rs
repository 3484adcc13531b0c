//! HTTP server configuration object.

use std::time::Duration;

use backend::domain::AdminSeed;
use backend::inbound::http::session_config::SessionSettings;
use backend::outbound::email::EmailJsConfig;
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: (String, u16),
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) email: Option<(EmailJsConfig, Duration)>,
    pub(crate) allowed_origins: Vec<String>,
    pub(crate) password_reset_url: String,
    pub(crate) admin_seed: Option<AdminSeed>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: (String, u16),
        password_reset_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            email: None,
            allowed_origins: Vec::new(),
            password_reset_url: password_reset_url.into(),
            admin_seed: None,
        }
    }

    /// Persist documents in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Deliver email through the EmailJS-compatible provider.
    #[must_use]
    pub fn with_email(mut self, config: EmailJsConfig, timeout: Duration) -> Self {
        self.email = Some((config, timeout));
        self
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Create this administrator at startup unless the email is taken.
    #[must_use]
    pub fn with_admin_seed(mut self, seed: Option<AdminSeed>) -> Self {
        self.admin_seed = seed;
        self
    }
}
