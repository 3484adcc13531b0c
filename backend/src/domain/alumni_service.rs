//! Alumni registry management and cross-entity synchronisation.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::csv_import::{ImportReport, read_roster};
use super::record::Record;
use super::repository::{Collections, Repository};
use super::user_service::validate_email;
use super::{
    AlumniId, AlumniRecord, Error, InlineImage, OfficerPosition, User, clean_person_name,
    normalize_name,
};

/// Earliest and latest accepted batch years.
pub const BATCH_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Create or replace payload for an alumni record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub batch_year: i32,
    pub alumni_id: String,
    #[serde(default)]
    pub photo: Option<InlineImage>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Optional list filters.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniFilter {
    pub batch_year: Option<i32>,
    /// Case-insensitive substring of the name or the Alumni ID.
    pub search: Option<String>,
}

struct ValidDraft {
    name: String,
    email: String,
    batch_year: i32,
    alumni_id: AlumniId,
    photo: Option<InlineImage>,
    active: bool,
}

pub(crate) fn validate_batch_year(batch_year: i32) -> Result<i32, Error> {
    if BATCH_YEAR_RANGE.contains(&batch_year) {
        Ok(batch_year)
    } else {
        Err(Error::invalid_request(format!(
            "batch year {batch_year} is outside {}..={}",
            BATCH_YEAR_RANGE.start(),
            BATCH_YEAR_RANGE.end()
        )))
    }
}

fn validate_draft(draft: AlumniDraft) -> Result<ValidDraft, Error> {
    let name =
        clean_person_name(&draft.name).map_err(|err| Error::invalid_request(err.to_string()))?;
    let alumni_id =
        AlumniId::parse(&draft.alumni_id).map_err(|err| Error::invalid_request(err.to_string()))?;
    let email = match draft.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => validate_email(email)?,
        _ => alumni_id.placeholder_email(),
    };
    Ok(ValidDraft {
        name,
        email,
        batch_year: validate_batch_year(draft.batch_year)?,
        alumni_id,
        photo: draft.photo,
        active: draft.active,
    })
}

/// Operations on the `alumni_records` collection.
#[derive(Clone)]
pub struct AlumniService {
    alumni: Repository<AlumniRecord>,
    users: Repository<User>,
    officers: Repository<OfficerPosition>,
    clock: Arc<dyn Clock>,
}

impl AlumniService {
    pub fn new(collections: &Collections, clock: Arc<dyn Clock>) -> Self {
        Self {
            alumni: collections.repository(),
            users: collections.repository(),
            officers: collections.repository(),
            clock,
        }
    }

    /// Live records ordered by batch year then name.
    pub async fn list(&self, filter: &AlumniFilter) -> Result<Vec<AlumniRecord>, Error> {
        let mut records = match filter.batch_year {
            Some(batch_year) => self.alumni.list_where("batchYear", batch_year).await?,
            None => self.alumni.list().await?,
        };
        if let Some(search) = filter.search.as_deref().map(normalize_name)
            && !search.is_empty()
        {
            let upper = search.to_ascii_uppercase();
            records.retain(|record| {
                record.normalized_name.contains(&search)
                    || record.alumni_id.as_ref().contains(&upper)
            });
        }
        records.sort_by(|a, b| {
            a.batch_year
                .cmp(&b.batch_year)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });
        Ok(records)
    }

    pub async fn get(&self, id: Uuid) -> Result<AlumniRecord, Error> {
        self.alumni.get(id).await
    }

    async fn ensure_unique_id(&self, alumni_id: &AlumniId, except: Option<Uuid>) -> Result<(), Error> {
        let taken = self
            .alumni
            .list_where("alumniId", alumni_id)
            .await?
            .into_iter()
            .any(|record| Some(record.id) != except);
        if taken {
            return Err(Error::conflict(format!("alumni id {alumni_id} is already registered")));
        }
        Ok(())
    }

    pub async fn create(&self, draft: AlumniDraft) -> Result<AlumniRecord, Error> {
        let valid = validate_draft(draft)?;
        self.ensure_unique_id(&valid.alumni_id, None).await?;
        let mut record = AlumniRecord::new(
            valid.name,
            valid.email,
            valid.batch_year,
            valid.alumni_id,
            self.clock.utc(),
        );
        record.photo = valid.photo;
        record.active = valid.active;
        self.alumni.insert(&record).await?;
        Ok(record)
    }

    /// Replace a record and copy identity fields to its linked user.
    pub async fn update(&self, id: Uuid, draft: AlumniDraft) -> Result<AlumniRecord, Error> {
        let valid = validate_draft(draft)?;
        let mut record = self.alumni.get(id).await?;
        self.ensure_unique_id(&valid.alumni_id, Some(id)).await?;
        record.rename(valid.name);
        record.email = valid.email;
        record.batch_year = valid.batch_year;
        record.alumni_id = valid.alumni_id;
        record.photo = valid.photo;
        record.active = valid.active;
        record.touch(self.clock.utc());
        self.alumni.save(&record).await?;

        if let Some(user_id) = record.user_id
            && let Some(mut user) = self.users.find(user_id).await?
        {
            user.rename(record.name.clone());
            user.email = record.email.clone();
            user.batch_year = Some(record.batch_year);
            user.alumni_id = Some(record.alumni_id.clone());
            user.photo = record.photo.clone();
            user.touch(record.updated_at);
            self.users.save_logged(&user, "alumni record update").await?;
        }
        Ok(record)
    }

    /// Soft delete a record, its officer positions, and its user's link.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut record = self.alumni.get(id).await?;
        let now = self.clock.utc();
        record.mark_deleted(now);
        self.alumni.save(&record).await?;

        for mut position in self.officers.list_where("alumniRecordId", id).await? {
            position.mark_deleted(now);
            self.officers
                .save_logged(&position, "alumni record deletion")
                .await?;
        }

        if let Some(user_id) = record.user_id
            && let Some(mut user) = self.users.find(user_id).await?
        {
            user.officer = None;
            user.alumni_record_id = None;
            user.touch(now);
            self.users.save_logged(&user, "alumni record deletion").await?;
        }
        Ok(())
    }

    /// Link a record to an existing user account.
    pub async fn link_user(&self, id: Uuid, user_id: Uuid) -> Result<AlumniRecord, Error> {
        let mut record = self.alumni.get(id).await?;
        let mut user = self.users.get(user_id).await?;
        if let Some(existing) = record.user_id
            && existing != user_id
            && self.users.find(existing).await?.is_some()
        {
            return Err(Error::conflict(format!(
                "alumni record {id} is already linked to another user"
            )));
        }
        let now = self.clock.utc();
        record.user_id = Some(user_id);
        record.touch(now);
        self.alumni.save(&record).await?;

        user.alumni_record_id = Some(record.id);
        user.alumni_id = Some(record.alumni_id.clone());
        user.batch_year = Some(record.batch_year);
        user.touch(now);
        self.users.save_logged(&user, "alumni link").await?;
        Ok(record)
    }

    /// Import a batch roster. Row failures are reported, never fatal.
    pub async fn import_csv(&self, text: &str, batch_year: i32) -> Result<ImportReport, Error> {
        let batch_year = validate_batch_year(batch_year)?;
        let mut seen: HashSet<AlumniId> = self
            .alumni
            .list()
            .await?
            .into_iter()
            .map(|record| record.alumni_id)
            .collect();

        let mut report = ImportReport::default();
        for entry in read_roster(text, &mut report) {
            let alumni_id = match AlumniId::parse(&entry.raw_id) {
                Ok(id) => id,
                Err(err) => {
                    report.skip(entry.row, format!("{} skipped: {err}", display_name(&entry.name)));
                    continue;
                }
            };
            let name = match clean_person_name(&entry.name) {
                Ok(name) => name,
                Err(err) => {
                    report.skip(entry.row, format!("{alumni_id} skipped: {err}"));
                    continue;
                }
            };
            if !seen.insert(alumni_id.clone()) {
                report.skip(entry.row, format!("duplicate alumni id {alumni_id} ({name})"));
                continue;
            }
            let email = alumni_id.placeholder_email();
            let record = AlumniRecord::new(name, email, batch_year, alumni_id, self.clock.utc());
            match self.alumni.insert(&record).await {
                Ok(()) => report.imported += 1,
                Err(err) => report.skip(entry.row, format!("{} not saved: {err}", record.alumni_id)),
            }
        }
        info!(
            batch_year,
            imported = report.imported,
            skipped = report.skipped,
            "alumni roster imported"
        );
        Ok(report)
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "unnamed entry" } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, OfficerSnapshot, Role};
    use crate::test_support::{MutableClock, fixture_timestamp, in_memory_collections};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    struct Harness {
        service: AlumniService,
        users: Repository<User>,
        officers: Repository<OfficerPosition>,
        alumni: Repository<AlumniRecord>,
    }

    #[fixture]
    fn harness() -> Harness {
        let collections = in_memory_collections();
        Harness {
            service: AlumniService::new(&collections, Arc::new(MutableClock::default())),
            users: collections.repository(),
            officers: collections.repository(),
            alumni: collections.repository(),
        }
    }

    fn draft(name: &str, alumni_id: &str) -> AlumniDraft {
        AlumniDraft {
            name: name.into(),
            email: None,
            batch_year: 2004,
            alumni_id: alumni_id.into(),
            photo: None,
            active: true,
        }
    }

    const ROSTER: &str = "\
Male,,ID,Female,,ID
Juan Cruz,,200401-A,Maria Santos,,200402-B
Pedro Garcia,,20040-C,Liza Tan,,200402-B
Jose Rizal,,200403-C,,,
";

    #[rstest]
    #[tokio::test]
    async fn create_validates_and_upper_cases_alumni_id(harness: Harness) {
        let record = harness.service.create(draft("Ana Reyes", "200401-a")).await.expect("create");
        assert_eq!(record.alumni_id.as_ref(), "200401-A");
        assert_eq!(record.email, "200401-a@placeholder.alumni.invalid");
    }

    #[rstest]
    #[case("12345-A")]
    #[case("123456-1")]
    #[tokio::test]
    async fn create_rejects_malformed_ids(harness: Harness, #[case] alumni_id: &str) {
        let err = harness
            .service
            .create(draft("Ana Reyes", alumni_id))
            .await
            .expect_err("invalid id");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn alumni_ids_are_unique_among_live_records(harness: Harness) {
        let first = harness.service.create(draft("Ana", "200401-A")).await.expect("create");
        let err = harness
            .service
            .create(draft("Ben", "200401-a"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);

        harness.service.delete(first.id).await.expect("delete");
        harness
            .service
            .create(draft("Ben", "200401-A"))
            .await
            .expect("id free again after soft delete");
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_record_is_hidden_but_stored(harness: Harness) {
        let record = harness.service.create(draft("Ana", "200401-A")).await.expect("create");
        harness.service.delete(record.id).await.expect("delete");

        let listed = harness.service.list(&AlumniFilter::default()).await.expect("list");
        assert!(listed.is_empty());
        let err = harness.service.get(record.id).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(
            harness
                .alumni
                .find_including_deleted(record.id)
                .await
                .expect("fetch")
                .is_some()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_to_positions_and_user_link(harness: Harness) {
        let record = harness.service.create(draft("Ana", "200401-A")).await.expect("create");
        let mut user = User::new("Ana".into(), "ana@example.com".into(), Role::Alumni, fixture_timestamp());
        user.alumni_record_id = Some(record.id);
        harness.users.insert(&user).await.expect("user");
        harness.service.link_user(record.id, user.id).await.expect("link");

        let position = OfficerPosition {
            id: Uuid::new_v4(),
            title: "Batch President".into(),
            alumni_record_id: record.id,
            batch_year: 2004,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
            end_date: None,
            active: true,
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
            deleted_at: None,
        };
        harness.officers.insert(&position).await.expect("position");
        let mut linked = harness.users.get(user.id).await.expect("user");
        linked.officer = Some(OfficerSnapshot {
            position_id: position.id,
            title: position.title.clone(),
            batch_year: 2004,
        });
        harness.users.save(&linked).await.expect("snapshot");

        harness.service.delete(record.id).await.expect("delete");

        assert!(harness.officers.list().await.expect("officers").is_empty());
        let user_after = harness.users.get(user.id).await.expect("user");
        assert_eq!(user_after.officer, None);
        assert_eq!(user_after.alumni_record_id, None);
    }

    #[rstest]
    #[tokio::test]
    async fn update_propagates_to_linked_user(harness: Harness) {
        let record = harness.service.create(draft("Ana", "200401-A")).await.expect("create");
        let user = User::new("Ana".into(), "ana@example.com".into(), Role::Alumni, fixture_timestamp());
        harness.users.insert(&user).await.expect("user");
        harness.service.link_user(record.id, user.id).await.expect("link");

        let mut change = draft("Ana Reyes-Cruz", "200401-A");
        change.batch_year = 2005;
        change.email = Some("ana.cruz@example.com".into());
        harness.service.update(record.id, change).await.expect("update");

        let synced = harness.users.get(user.id).await.expect("user");
        assert_eq!(synced.name, "Ana Reyes-Cruz");
        assert_eq!(synced.batch_year, Some(2005));
        assert_eq!(synced.email, "ana.cruz@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn import_skips_invalid_and_duplicate_halves(harness: Harness) {
        let report = harness.service.import_csv(ROSTER, 2004).await.expect("import");
        assert_eq!(report.imported, 3);
        assert_eq!(report.skipped, 2);
        assert!(report.messages.iter().any(|m| m.starts_with("Row 3:") && m.contains("Pedro Garcia")));
        assert!(report.messages.iter().any(|m| m.starts_with("Row 3:") && m.contains("duplicate")));

        let records = harness.service.list(&AlumniFilter::default()).await.expect("list");
        assert!(records.iter().all(|r| r.batch_year == 2004));
        assert!(records.iter().all(|r| r.email.ends_with("@placeholder.alumni.invalid")));
    }

    #[rstest]
    #[tokio::test]
    async fn reimporting_the_same_roster_imports_nothing(harness: Harness) {
        let first = harness.service.import_csv(ROSTER, 2004).await.expect("first import");
        let second = harness.service.import_csv(ROSTER, 2004).await.expect("second import");
        assert_eq!(first.imported, 3);
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 5);
        assert_eq!(
            harness.service.list(&AlumniFilter::default()).await.expect("list").len(),
            3
        );
    }

    #[rstest]
    #[tokio::test]
    async fn list_filters_by_batch_and_search(harness: Harness) {
        harness.service.create(draft("Ana Reyes", "200401-A")).await.expect("create");
        let mut other = draft("Ben Cruz", "199901-B");
        other.batch_year = 1999;
        harness.service.create(other).await.expect("create");

        let batch = AlumniFilter { batch_year: Some(1999), search: None };
        let found = harness.service.list(&batch).await.expect("list");
        assert_eq!(found.len(), 1);

        let search = AlumniFilter { batch_year: None, search: Some(" REYES ".into()) };
        let found = harness.service.list(&search).await.expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|r| r.name.as_str()), Some("Ana Reyes"));

        let by_id = AlumniFilter { batch_year: None, search: Some("199901".into()) };
        assert_eq!(harness.service.list(&by_id).await.expect("list").len(), 1);
    }
}
