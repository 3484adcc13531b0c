//! User accounts and their public projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::alumni_id::AlumniId;
use super::image::InlineImage;
use super::record::{Collection, impl_record};

/// Authorization role attached to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Alumni,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alumni => "alumni",
            Self::Admin => "admin",
        }
    }

    /// Parse the stored role string.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "alumni" => Some(Self::Alumni),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Optional social profile links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Denormalised copy of the officer position a user currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficerSnapshot {
    pub position_id: Uuid,
    pub title: String,
    pub batch_year: i32,
}

/// Stored account document (`users` collection).
///
/// `password_hash` is absent for accounts provisioned from alumni records
/// until their owner sets a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub batch_year: Option<i32>,
    #[serde(default)]
    pub alumni_id: Option<AlumniId>,
    #[serde(default)]
    pub photo: Option<InlineImage>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub following: Vec<Uuid>,
    #[serde(default)]
    pub followers: Vec<Uuid>,
    #[serde(default)]
    pub officer: Option<OfficerSnapshot>,
    #[serde(default)]
    pub alumni_record_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(User, Collection::Users);

impl User {
    /// Fresh active account with no profile details.
    #[must_use]
    pub fn new(name: String, email: String, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            normalized_name: super::names::normalize_name(&name),
            name,
            email,
            password_hash: None,
            role,
            batch_year: None,
            alumni_id: None,
            photo: None,
            bio: None,
            occupation: None,
            company: None,
            location: None,
            social_links: SocialLinks::default(),
            following: Vec::new(),
            followers: Vec::new(),
            officer: None,
            alumni_record_id: None,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replace the display name and keep the lookup key in sync.
    pub fn rename(&mut self, name: String) {
        self.normalized_name = super::names::normalize_name(&name);
        self.name = name;
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Public view of a [`User`], without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub batch_year: Option<i32>,
    pub alumni_id: Option<AlumniId>,
    pub photo: Option<InlineImage>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub social_links: SocialLinks,
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
    pub officer: Option<OfficerSnapshot>,
    pub alumni_record_id: Option<Uuid>,
    pub has_password: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            batch_year: user.batch_year,
            alumni_id: user.alumni_id.clone(),
            photo: user.photo.clone(),
            bio: user.bio.clone(),
            occupation: user.occupation.clone(),
            company: user.company.clone(),
            location: user.location.clone(),
            social_links: user.social_links.clone(),
            following: user.following.clone(),
            followers: user.followers.clone(),
            officer: user.officer.clone(),
            alumni_record_id: user.alumni_record_id,
            has_password: user.password_hash.is_some(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}
