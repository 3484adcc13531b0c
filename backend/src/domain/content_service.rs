//! Submission, moderation and publication of community content.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use super::notification_service::Announcer;
use super::record::Record;
use super::repository::{Collections, Repository};
use super::site_service::current_settings;
use super::{ContentKind, Error, Moderated, ModerationStatus, Role, SystemSettings};

/// Identity of whoever submits content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: Uuid,
    pub role: Role,
}

/// Moderated content operations for one kind `T`.
pub struct ContentService<T> {
    records: Repository<T>,
    settings: Repository<SystemSettings>,
    announcer: Announcer,
    clock: Arc<dyn Clock>,
}

impl<T> Clone for ContentService<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            settings: self.settings.clone(),
            announcer: self.announcer.clone(),
            clock: self.clock.clone(),
        }
    }
}

fn newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

impl<T: Moderated> ContentService<T> {
    pub fn new(collections: &Collections, announcer: Announcer, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: collections.repository(),
            settings: collections.repository(),
            announcer,
            clock,
        }
    }

    /// Approved content, newest first.
    pub async fn list_published(&self) -> Result<Vec<T>, Error> {
        let mut records = self
            .records
            .list_where("status", ModerationStatus::Approved)
            .await?;
        newest_first(&mut records);
        Ok(records)
    }

    /// All live content regardless of status, newest first.
    pub async fn list_all(&self) -> Result<Vec<T>, Error> {
        let mut records = self.records.list().await?;
        newest_first(&mut records);
        Ok(records)
    }

    /// Fetch one record. Unapproved content is visible to admins and to
    /// its submitter only.
    pub async fn get(&self, id: Uuid, viewer: Option<Submitter>) -> Result<T, Error> {
        let record = self.records.get(id).await?;
        let visible = record.status() == ModerationStatus::Approved
            || viewer.is_some_and(|v| v.role == Role::Admin || v.user_id == record.submitted_by());
        if visible {
            Ok(record)
        } else {
            Err(Error::not_found(format!("{} {id} not found", T::KIND.noun())))
        }
    }

    pub async fn submit(&self, draft: T::Draft, submitter: Submitter) -> Result<T, Error> {
        let now = self.clock.utc();
        let settings = current_settings(&self.settings, now).await?;
        if T::KIND == ContentKind::Donation && !settings.donations_enabled {
            return Err(Error::forbidden("donations are currently disabled"));
        }
        let status = if submitter.role == Role::Admin || !settings.submissions_require_approval {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Pending
        };
        let record = T::from_draft(draft, submitter.user_id, status, now)?;
        self.records.insert(&record).await?;
        info!(kind = T::KIND.noun(), id = %record.id(), ?status, "content submitted");
        if status == ModerationStatus::Approved {
            self.announce(&record).await;
        }
        Ok(record)
    }

    pub async fn moderate(&self, id: Uuid, status: ModerationStatus) -> Result<T, Error> {
        let mut record = self.records.get(id).await?;
        let previous = record.status();
        if previous == status {
            return Ok(record);
        }
        record.set_status(status);
        record.touch(self.clock.utc());
        self.records.save(&record).await?;
        info!(kind = T::KIND.noun(), %id, ?previous, ?status, "content moderated");
        if status == ModerationStatus::Approved {
            self.announce(&record).await;
        }
        Ok(record)
    }

    pub async fn update(&self, id: Uuid, draft: T::Draft) -> Result<T, Error> {
        let mut record = self.records.get(id).await?;
        record.apply_draft(draft)?;
        record.touch(self.clock.utc());
        self.records.save(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut record = self.records.get(id).await?;
        record.mark_deleted(self.clock.utc());
        self.records.save(&record).await
    }

    async fn announce(&self, record: &T) {
        let Some(announcement) = record.announcement() else {
            return;
        };
        if let Err(err) = self.announcer.announce(announcement).await {
            warn!(kind = T::KIND.noun(), id = %record.id(), error = %err, "announcement failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Donation, DonationDraft, ErrorCode, Event, EventDraft, Notification, SYSTEM_SETTINGS_ID,
    };
    use crate::test_support::{
        MutableClock, RecordingEmailSender, fixture_timestamp, in_memory_collections,
    };

    struct Harness<T> {
        service: ContentService<T>,
        settings: Repository<SystemSettings>,
        notifications: Repository<Notification>,
    }

    fn harness<T: Moderated>() -> Harness<T> {
        let collections = in_memory_collections();
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::default());
        let announcer = Announcer::new(
            &collections,
            Arc::new(RecordingEmailSender::default()),
            clock.clone(),
        );
        Harness {
            service: ContentService::new(&collections, announcer, clock),
            settings: collections.repository(),
            notifications: collections.repository(),
        }
    }

    fn alumnus() -> Submitter {
        Submitter {
            user_id: Uuid::new_v4(),
            role: Role::Alumni,
        }
    }

    fn admin() -> Submitter {
        Submitter {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    fn event_draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            description: "Details".into(),
            location: None,
            starts_at: fixture_timestamp(),
            ends_at: None,
            cover_image: None,
        }
    }

    fn donation_draft() -> DonationDraft {
        DonationDraft {
            donor_name: "Ana".into(),
            amount_cents: 10_000,
            currency: "PHP".into(),
            message: None,
            anonymous: false,
        }
    }

    async fn store_settings(harness: &Harness<impl Moderated>, require_approval: bool, donations: bool) {
        let mut settings = SystemSettings::initial(fixture_timestamp());
        settings.submissions_require_approval = require_approval;
        settings.donations_enabled = donations;
        assert_eq!(settings.id, SYSTEM_SETTINGS_ID);
        harness.settings.save(&settings).await.expect("settings");
    }

    #[tokio::test]
    async fn alumni_submissions_wait_for_approval() {
        let harness = harness::<Event>();
        let submitter = alumnus();
        let event = harness
            .service
            .submit(event_draft("Reunion"), submitter)
            .await
            .expect("submit");
        assert_eq!(event.status, ModerationStatus::Pending);
        assert!(harness.service.list_published().await.expect("list").is_empty());

        let err = harness.service.get(event.id, None).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
        harness
            .service
            .get(event.id, Some(submitter))
            .await
            .expect("submitter sees own pending event");
        harness
            .service
            .get(event.id, Some(admin()))
            .await
            .expect("admin sees pending event");
    }

    #[tokio::test]
    async fn admin_submissions_are_published_and_announced() {
        let harness = harness::<Event>();
        harness
            .service
            .submit(event_draft("Gala"), admin())
            .await
            .expect("submit");
        assert_eq!(harness.service.list_published().await.expect("list").len(), 1);
        assert_eq!(harness.notifications.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn approval_setting_can_be_switched_off() {
        let harness = harness::<Event>();
        store_settings(&harness, false, true).await;
        let event = harness
            .service
            .submit(event_draft("Picnic"), alumnus())
            .await
            .expect("submit");
        assert_eq!(event.status, ModerationStatus::Approved);
    }

    #[tokio::test]
    async fn approving_an_event_announces_it_once() {
        let harness = harness::<Event>();
        let event = harness
            .service
            .submit(event_draft("Reunion"), alumnus())
            .await
            .expect("submit");
        harness
            .service
            .moderate(event.id, ModerationStatus::Approved)
            .await
            .expect("approve");
        harness
            .service
            .moderate(event.id, ModerationStatus::Approved)
            .await
            .expect("approve again");
        assert_eq!(harness.notifications.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn rejected_content_stays_private() {
        let harness = harness::<Event>();
        let event = harness
            .service
            .submit(event_draft("Spam"), alumnus())
            .await
            .expect("submit");
        harness
            .service
            .moderate(event.id, ModerationStatus::Rejected)
            .await
            .expect("reject");
        assert!(harness.service.list_published().await.expect("list").is_empty());
        assert_eq!(harness.service.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn donations_can_be_disabled() {
        let harness = harness::<Donation>();
        store_settings(&harness, true, false).await;
        let err = harness
            .service
            .submit(donation_draft(), alumnus())
            .await
            .expect_err("disabled");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn deleted_content_disappears_from_every_list() {
        let harness = harness::<Event>();
        let event = harness
            .service
            .submit(event_draft("Gala"), admin())
            .await
            .expect("submit");
        harness.service.delete(event.id).await.expect("delete");
        assert!(harness.service.list_published().await.expect("list").is_empty());
        assert!(harness.service.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_revalidates_the_draft() {
        let harness = harness::<Event>();
        let event = harness
            .service
            .submit(event_draft("Gala"), admin())
            .await
            .expect("submit");
        let err = harness
            .service
            .update(event.id, event_draft("   "))
            .await
            .expect_err("blank title");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let renamed = harness
            .service
            .update(event.id, event_draft("Grand Gala"))
            .await
            .expect("update");
        assert_eq!(renamed.title, "Grand Gala");
    }
}
