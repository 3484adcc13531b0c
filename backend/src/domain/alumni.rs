//! Alumni registry entries (`alumni_records` collection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::alumni_id::AlumniId;
use super::image::InlineImage;
use super::names::normalize_name;
use super::record::{Collection, impl_record};

/// One registered alumnus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniRecord {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub email: String,
    pub batch_year: i32,
    pub alumni_id: AlumniId,
    #[serde(default)]
    pub photo: Option<InlineImage>,
    pub active: bool,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(AlumniRecord, Collection::AlumniRecords);

impl AlumniRecord {
    /// New active, unlinked record.
    #[must_use]
    pub fn new(
        name: String,
        email: String,
        batch_year: i32,
        alumni_id: AlumniId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            normalized_name: normalize_name(&name),
            name,
            email,
            batch_year,
            alumni_id,
            photo: None,
            active: true,
            user_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn rename(&mut self, name: String) {
        self.normalized_name = normalize_name(&name);
        self.name = name;
    }
}
