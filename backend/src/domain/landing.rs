//! Landing page content and site-wide settings.
//!
//! Both live in the `landing_config` collection under fixed identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::image::InlineImage;
use super::record::{Collection, impl_record};
use super::user::SocialLinks;

/// Identifier of the single [`LandingConfig`] document.
pub const LANDING_CONFIG_ID: Uuid = Uuid::from_u128(0x6c61_6e64_696e_6700_0000_0000_0000_0001);
/// Identifier of the single [`SystemSettings`] document.
pub const SYSTEM_SETTINGS_ID: Uuid = Uuid::from_u128(0x6c61_6e64_696e_6700_0000_0000_0000_0002);

/// Public landing page copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingConfig {
    pub id: Uuid,
    pub hero_title: String,
    pub hero_subtitle: String,
    #[serde(default)]
    pub hero_image: Option<InlineImage>,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(LandingConfig, Collection::LandingConfig);

impl LandingConfig {
    /// Copy served before an administrator saves any content.
    #[must_use]
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            id: LANDING_CONFIG_ID,
            hero_title: "Welcome home, alumni".to_owned(),
            hero_subtitle: "Stay connected with your batchmates".to_owned(),
            hero_image: None,
            about: String::new(),
            mission: String::new(),
            vision: String::new(),
            contact_email: None,
            phone: None,
            address: None,
            social_links: SocialLinks::default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Editable landing page fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingDraft {
    pub hero_title: String,
    pub hero_subtitle: String,
    #[serde(default)]
    pub hero_image: Option<InlineImage>,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// Site-wide behaviour toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub id: Uuid,
    pub submissions_require_approval: bool,
    pub donations_enabled: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(SystemSettings, Collection::LandingConfig);

impl SystemSettings {
    /// Settings in effect before an administrator saves any.
    #[must_use]
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            id: SYSTEM_SETTINGS_ID,
            submissions_require_approval: true,
            donations_enabled: true,
            maintenance_message: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Editable settings.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDraft {
    pub submissions_require_approval: bool,
    pub donations_enabled: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
}
