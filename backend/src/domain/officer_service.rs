//! Officer position management.
//!
//! After every mutation the affected alumni record's user receives a fresh
//! [`OfficerSnapshot`] so profiles can show the title without a join.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::alumni_service::validate_batch_year;
use super::record::Record;
use super::repository::{Collections, Repository};
use super::{AlumniRecord, BATCH_PRESIDENT, Error, OfficerPosition, OfficerSnapshot, User};

/// Create or replace payload for an officer position.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficerDraft {
    pub title: String,
    pub alumni_record_id: Uuid,
    pub batch_year: i32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

const TITLE_MAX: usize = 80;

fn validate(draft: &OfficerDraft) -> Result<String, Error> {
    let title = draft.title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(Error::invalid_request("officer title must not be empty"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(Error::invalid_request(format!(
            "officer title must be at most {TITLE_MAX} characters"
        )));
    }
    validate_batch_year(draft.batch_year)?;
    if draft.end_date.is_some_and(|end| end < draft.start_date) {
        return Err(Error::invalid_request("end date must not precede start date"));
    }
    Ok(title)
}

/// Operations on the `alumni_officers` collection.
#[derive(Clone)]
pub struct OfficerService {
    officers: Repository<OfficerPosition>,
    alumni: Repository<AlumniRecord>,
    users: Repository<User>,
    clock: Arc<dyn Clock>,
}

impl OfficerService {
    pub fn new(collections: &Collections, clock: Arc<dyn Clock>) -> Self {
        Self {
            officers: collections.repository(),
            alumni: collections.repository(),
            users: collections.repository(),
            clock,
        }
    }

    /// Live positions, newest batch first.
    pub async fn list(&self, batch_year: Option<i32>) -> Result<Vec<OfficerPosition>, Error> {
        let mut positions = match batch_year {
            Some(year) => self.officers.list_where("batchYear", year).await?,
            None => self.officers.list().await?,
        };
        positions.sort_by(|a, b| {
            b.batch_year
                .cmp(&a.batch_year)
                .then_with(|| b.is_batch_president().cmp(&a.is_batch_president()))
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(positions)
    }

    /// Reject a second active Batch President for the same batch year.
    async fn ensure_president_seat_free(
        &self,
        title: &str,
        batch_year: i32,
        active: bool,
        except: Option<Uuid>,
    ) -> Result<(), Error> {
        if !active || !super::is_batch_president_title(title) {
            return Ok(());
        }
        let occupied = self
            .officers
            .list_where("batchYear", batch_year)
            .await?
            .iter()
            .any(|position| position.holds_president_seat() && Some(position.id) != except);
        if occupied {
            return Err(Error::conflict(format!(
                "batch {batch_year} already has an active {BATCH_PRESIDENT}"
            )));
        }
        Ok(())
    }

    pub async fn create(&self, draft: OfficerDraft) -> Result<OfficerPosition, Error> {
        let title = validate(&draft)?;
        self.alumni.get(draft.alumni_record_id).await?;
        self.ensure_president_seat_free(&title, draft.batch_year, draft.active, None)
            .await?;
        let now = self.clock.utc();
        let position = OfficerPosition {
            id: Uuid::new_v4(),
            title,
            alumni_record_id: draft.alumni_record_id,
            batch_year: draft.batch_year,
            start_date: draft.start_date,
            end_date: draft.end_date,
            active: draft.active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.officers.insert(&position).await?;
        self.refresh_snapshot(position.alumni_record_id).await?;
        Ok(position)
    }

    pub async fn update(&self, id: Uuid, draft: OfficerDraft) -> Result<OfficerPosition, Error> {
        let title = validate(&draft)?;
        let mut position = self.officers.get(id).await?;
        self.alumni.get(draft.alumni_record_id).await?;
        self.ensure_president_seat_free(&title, draft.batch_year, draft.active, Some(id))
            .await?;
        let previous_record = position.alumni_record_id;
        position.title = title;
        position.alumni_record_id = draft.alumni_record_id;
        position.batch_year = draft.batch_year;
        position.start_date = draft.start_date;
        position.end_date = draft.end_date;
        position.active = draft.active;
        position.touch(self.clock.utc());
        self.officers.save(&position).await?;

        self.refresh_snapshot(position.alumni_record_id).await?;
        if previous_record != position.alumni_record_id {
            self.refresh_snapshot(previous_record).await?;
        }
        Ok(position)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut position = self.officers.get(id).await?;
        position.mark_deleted(self.clock.utc());
        self.officers.save(&position).await?;
        self.refresh_snapshot(position.alumni_record_id).await
    }

    /// Recompute the officer snapshot of the user linked to `record_id`.
    async fn refresh_snapshot(&self, record_id: Uuid) -> Result<(), Error> {
        let Some(record) = self.alumni.find(record_id).await? else {
            return Ok(());
        };
        let Some(user_id) = record.user_id else {
            return Ok(());
        };
        let Some(mut user) = self.users.find(user_id).await? else {
            return Ok(());
        };
        let current = self
            .officers
            .list_where("alumniRecordId", record_id)
            .await?
            .into_iter()
            .filter(|position| position.active)
            .max_by_key(|position| position.start_date)
            .map(|position| OfficerSnapshot {
                position_id: position.id,
                title: position.title,
                batch_year: position.batch_year,
            });
        if user.officer == current {
            return Ok(());
        }
        user.officer = current;
        user.touch(self.clock.utc());
        self.users.save_logged(&user, "officer snapshot").await
    }
}
