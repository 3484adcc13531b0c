//! Officer positions held by alumni (`alumni_officers` collection).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::record::{Collection, impl_record};

/// Title that may be held by at most one active officer per batch year.
pub const BATCH_PRESIDENT: &str = "Batch President";

/// An officer role assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficerPosition {
    pub id: Uuid,
    pub title: String,
    pub alumni_record_id: Uuid,
    pub batch_year: i32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(OfficerPosition, Collection::AlumniOfficers);

impl OfficerPosition {
    #[must_use]
    pub fn is_batch_president(&self) -> bool {
        is_batch_president_title(&self.title)
    }

    /// Whether this position occupies its batch's president seat.
    #[must_use]
    pub fn holds_president_seat(&self) -> bool {
        self.active && self.deleted_at.is_none() && self.is_batch_president()
    }
}

/// Case-insensitive match on the president title.
#[must_use]
pub fn is_batch_president_title(title: &str) -> bool {
    title.trim().eq_ignore_ascii_case(BATCH_PRESIDENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Batch President", true)]
    #[case("batch president", true)]
    #[case("  BATCH PRESIDENT ", true)]
    #[case("Batch Vice President", false)]
    #[case("Treasurer", false)]
    fn recognises_president_title(#[case] title: &str, #[case] expected: bool) {
        assert_eq!(is_batch_president_title(title), expected);
    }
}
