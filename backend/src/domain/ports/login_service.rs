//! Driving port for login by name or Alumni ID.
//!
//! Inbound adapters call this port without knowing how identities are
//! stored, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginAttempt, LoginOutcome};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Resolve the attempt to one user or a list of candidates.
    async fn login(&self, attempt: &LoginAttempt) -> Result<LoginOutcome, Error>;
}
