//! Login attempts and their outcomes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::alumni_id::AlumniId;
use super::error::Error;
use super::user::User;

/// Identifier plus optional secret supplied by a client.
///
/// The password is wiped from memory on drop.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    identifier: String,
    password: Option<Zeroizing<String>>,
    candidate_id: Option<Uuid>,
}

impl LoginAttempt {
    /// Build an attempt, rejecting blank identifiers.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::LoginAttempt;
    ///
    /// let attempt = LoginAttempt::try_new("  Ana Reyes ", None, None).expect("valid");
    /// assert_eq!(attempt.identifier(), "Ana Reyes");
    /// assert!(LoginAttempt::try_new("   ", None, None).is_err());
    /// ```
    pub fn try_new(
        identifier: &str,
        password: Option<&str>,
        candidate_id: Option<Uuid>,
    ) -> Result<Self, Error> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::invalid_request("name or alumni id is required"));
        }
        Ok(Self {
            identifier: identifier.to_owned(),
            password: password
                .filter(|secret| !secret.is_empty())
                .map(|secret| Zeroizing::new(secret.to_owned())),
            candidate_id,
        })
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().map(String::as_str)
    }

    #[must_use]
    pub fn candidate_id(&self) -> Option<Uuid> {
        self.candidate_id
    }
}

/// Where a disambiguation candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CandidateSource {
    User,
    AlumniRecord,
}

/// One of several accounts matching a login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginCandidate {
    pub id: Uuid,
    pub source: CandidateSource,
    pub name: String,
    pub batch_year: Option<i32>,
    pub alumni_id: Option<AlumniId>,
}

/// Result of identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(Box<User>),
    MultipleMatches(Vec<LoginCandidate>),
}
