//! Password reset by emailed single-use token.
//!
//! Only the SHA-256 digest of a token is stored. Requests for unknown
//! addresses succeed silently so the endpoint cannot be used to probe for
//! accounts.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{EmailMessage, EmailSender, EmailTemplate, PasswordHasher};
use super::record::{Collection, Record, impl_record};
use super::repository::{Collections, Repository};
use super::user_service::validate_password;
use super::{Error, User, is_placeholder_email, normalize_email};

/// How long an issued token stays valid, in seconds.
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

const TOKEN_BYTES: usize = 32;

/// Stored reset token (`password_resets` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(PasswordResetToken, Collection::PasswordResets);

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues and redeems password reset tokens.
#[derive(Clone)]
pub struct PasswordResetService {
    users: Repository<User>,
    tokens: Repository<PasswordResetToken>,
    hasher: Arc<dyn PasswordHasher>,
    email: Arc<dyn EmailSender>,
    clock: Arc<dyn Clock>,
    reset_url: String,
}

impl PasswordResetService {
    /// `reset_url` is the page that accepts `?token=...`.
    pub fn new(
        collections: &Collections,
        hasher: Arc<dyn PasswordHasher>,
        email: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
        reset_url: impl Into<String>,
    ) -> Self {
        Self {
            users: collections.repository(),
            tokens: collections.repository(),
            hasher,
            email,
            clock,
            reset_url: reset_url.into(),
        }
    }

    /// Email a reset link to the account registered under `email`, if any.
    pub async fn request(&self, email: &str) -> Result<(), Error> {
        let email = normalize_email(email);
        if email.is_empty() || is_placeholder_email(&email) {
            return Ok(());
        }
        let Some(user) = self
            .users
            .list_where("email", &email)
            .await?
            .into_iter()
            .find(|user| user.active)
        else {
            info!("password reset requested for unknown address");
            return Ok(());
        };

        let token = generate_token();
        let now = self.clock.utc();
        let record = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_digest: digest(&token),
            expires_at: now + Duration::seconds(RESET_TOKEN_TTL_SECS),
            used: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.tokens.insert(&record).await?;

        let separator = if self.reset_url.contains('?') { '&' } else { '?' };
        let message = EmailMessage::new(EmailTemplate::PasswordReset, &user.email, &user.name)
            .with_param("reset_link", format!("{}{separator}token={token}", self.reset_url))
            .with_param("expires_in", "1 hour");
        if let Err(err) = self.email.send(&message).await {
            warn!(user_id = %user.id, error = %err, "password reset email failed");
        }
        Ok(())
    }

    /// Redeem `token` and set `new_password`.
    pub async fn confirm(&self, token: &str, new_password: &str) -> Result<(), Error> {
        validate_password(new_password)?;
        let invalid = || Error::invalid_request("reset token is invalid or has expired");
        let now = self.clock.utc();
        let mut record = self
            .tokens
            .list_where("tokenDigest", digest(token.trim()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(invalid)?;
        if record.used || record.expires_at <= now {
            return Err(invalid());
        }
        let mut user = self.users.find(record.user_id).await?.ok_or_else(invalid)?;
        let hash = self
            .hasher
            .hash(new_password)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        // Spend the token first so a failed password write cannot be replayed.
        record.used = true;
        record.touch(now);
        self.tokens.save_logged(&record, "password reset").await?;

        user.password_hash = Some(hash);
        user.touch(now);
        self.users.save_logged(&user, "password reset").await
    }
}
