//! In-app notifications and event announcements.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{EmailMessage, EmailSender, EmailTemplate};
use super::record::Record;
use super::repository::{Collections, Repository};
use super::{
    Announcement, Error, Notification, NotificationDraft, NotificationView, User,
    is_placeholder_email,
};

const TITLE_MAX: usize = 200;
const BODY_MAX: usize = 2_000;

fn validate(draft: &NotificationDraft) -> Result<(String, String), Error> {
    let title = draft.title.trim();
    let body = draft.body.trim();
    if title.is_empty() || body.is_empty() {
        return Err(Error::invalid_request("notification title and body are required"));
    }
    if title.chars().count() > TITLE_MAX || body.chars().count() > BODY_MAX {
        return Err(Error::invalid_request(format!(
            "notification title is limited to {TITLE_MAX} and body to {BODY_MAX} characters"
        )));
    }
    Ok((title.to_owned(), body.to_owned()))
}

/// Operations on the `notifications` collection.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Repository<Notification>,
    users: Repository<User>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(collections: &Collections, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications: collections.repository(),
            users: collections.repository(),
            clock,
        }
    }

    /// Notifications visible to `user`, newest first.
    pub async fn list_for(&self, user: Uuid) -> Result<Vec<NotificationView>, Error> {
        let mut visible: Vec<Notification> = self
            .notifications
            .list()
            .await?
            .into_iter()
            .filter(|notification| notification.is_visible_to(user))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible
            .iter()
            .map(|notification| NotificationView::for_user(notification, user))
            .collect())
    }

    pub async fn mark_read(&self, id: Uuid, user: Uuid) -> Result<(), Error> {
        let mut notification = self.notifications.get(id).await?;
        if !notification.is_visible_to(user) {
            return Err(Error::not_found(format!("notification {id} not found")));
        }
        if notification.is_read_by(user) {
            return Ok(());
        }
        notification.read_by.push(user);
        notification.touch(self.clock.utc());
        self.notifications.save(&notification).await
    }

    pub async fn create(&self, draft: NotificationDraft) -> Result<Notification, Error> {
        let (title, body) = validate(&draft)?;
        if let Some(audience) = draft.audience {
            self.users.get(audience).await?;
        }
        let now = self.clock.utc();
        let notification = Notification {
            id: Uuid::new_v4(),
            title,
            body,
            audience: draft.audience,
            link: draft.link.map(|link| link.trim().to_owned()).filter(|l| !l.is_empty()),
            read_by: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.notifications.insert(&notification).await?;
        Ok(notification)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut notification = self.notifications.get(id).await?;
        notification.mark_deleted(self.clock.utc());
        self.notifications.save(&notification).await
    }
}

/// Publishes approved-content announcements in-app and by email.
#[derive(Clone)]
pub struct Announcer {
    notifications: Repository<Notification>,
    users: Repository<User>,
    email: Arc<dyn EmailSender>,
    clock: Arc<dyn Clock>,
}

impl Announcer {
    pub fn new(collections: &Collections, email: Arc<dyn EmailSender>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications: collections.repository(),
            users: collections.repository(),
            email,
            clock,
        }
    }

    /// Store a broadcast notification, then email active users with real
    /// addresses. Email failures are logged and otherwise ignored.
    pub async fn announce(&self, announcement: Announcement) -> Result<(), Error> {
        let now = self.clock.utc();
        let notification = Notification {
            id: Uuid::new_v4(),
            title: announcement.title.clone(),
            body: announcement.body.clone(),
            audience: None,
            link: announcement.link.clone(),
            read_by: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.notifications.insert(&notification).await?;

        let recipients: Vec<User> = self
            .users
            .list_where("active", true)
            .await?
            .into_iter()
            .filter(|user| !user.email.is_empty() && !is_placeholder_email(&user.email))
            .collect();
        let mut failures = 0_usize;
        for user in &recipients {
            let message =
                EmailMessage::new(EmailTemplate::EventAnnouncement, &user.email, &user.name)
                    .with_param("title", announcement.title.as_str())
                    .with_param("message", announcement.body.as_str())
                    .with_param("link", announcement.link.clone().unwrap_or_default());
            if let Err(err) = self.email.send(&message).await {
                failures += 1;
                warn!(user_id = %user.id, error = %err, "announcement email failed");
            }
        }
        info!(
            notification_id = %notification.id,
            recipients = recipients.len(),
            failures,
            "announcement published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role};
    use crate::test_support::{
        MutableClock, RecordingEmailSender, fixture_timestamp, in_memory_collections,
    };
    use chrono::Duration;

    fn user(name: &str, email: &str) -> User {
        User::new(name.into(), email.into(), Role::Alumni, fixture_timestamp())
    }

    fn draft(title: &str, audience: Option<Uuid>) -> NotificationDraft {
        NotificationDraft {
            title: title.into(),
            body: "Body".into(),
            audience,
            link: None,
        }
    }

    #[tokio::test]
    async fn users_see_broadcasts_and_their_own_newest_first() {
        let collections = in_memory_collections();
        let clock = Arc::new(MutableClock::default());
        let service = NotificationService::new(&collections, clock.clone());
        let users: Repository<User> = collections.repository();
        let ana = user("Ana", "ana@example.com");
        let ben = user("Ben", "ben@example.com");
        users.insert(&ana).await.expect("ana");
        users.insert(&ben).await.expect("ben");

        service.create(draft("everyone", None)).await.expect("broadcast");
        clock.advance(Duration::minutes(1));
        service.create(draft("for ana", Some(ana.id))).await.expect("direct");
        clock.advance(Duration::minutes(1));
        service.create(draft("for ben", Some(ben.id))).await.expect("direct");

        let titles: Vec<_> = service
            .list_for(ana.id)
            .await
            .expect("list")
            .into_iter()
            .map(|view| view.title)
            .collect();
        assert_eq!(titles, vec!["for ana".to_owned(), "everyone".to_owned()]);
    }

    #[tokio::test]
    async fn mark_read_sets_flag_per_user() {
        let collections = in_memory_collections();
        let service = NotificationService::new(&collections, Arc::new(MutableClock::default()));
        let reader = Uuid::new_v4();
        let other = Uuid::new_v4();
        let created = service.create(draft("hello", None)).await.expect("create");

        service.mark_read(created.id, reader).await.expect("read");
        service.mark_read(created.id, reader).await.expect("idempotent");

        let views = service.list_for(reader).await.expect("list");
        assert!(views.iter().all(|view| view.read));
        let others = service.list_for(other).await.expect("list");
        assert!(others.iter().all(|view| !view.read));
    }

    #[tokio::test]
    async fn users_cannot_read_someone_elses_notification() {
        let collections = in_memory_collections();
        let service = NotificationService::new(&collections, Arc::new(MutableClock::default()));
        let users: Repository<User> = collections.repository();
        let ana = user("Ana", "ana@example.com");
        users.insert(&ana).await.expect("ana");
        let private = service.create(draft("secret", Some(ana.id))).await.expect("create");

        let err = service
            .mark_read(private.id, Uuid::new_v4())
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn announcements_email_only_real_addresses() {
        let collections = in_memory_collections();
        let email = Arc::new(RecordingEmailSender::default());
        let announcer = Announcer::new(&collections, email.clone(), Arc::new(MutableClock::default()));
        let users: Repository<User> = collections.repository();
        users.insert(&user("Ana", "ana@example.com")).await.expect("ana");
        users
            .insert(&user("Ben", "200401-a@placeholder.alumni.invalid"))
            .await
            .expect("ben");
        let mut inactive = user("Cid", "cid@example.com");
        inactive.active = false;
        users.insert(&inactive).await.expect("cid");

        announcer
            .announce(Announcement {
                title: "New event: Homecoming".into(),
                body: "Homecoming on June 1".into(),
                link: None,
            })
            .await
            .expect("announce");

        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent.first().map(|m| m.to_email.as_str()), Some("ana@example.com"));
        let notifications: Repository<Notification> = collections.repository();
        assert_eq!(notifications.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn announcement_survives_email_failures() {
        let collections = in_memory_collections();
        let announcer = Announcer::new(
            &collections,
            Arc::new(RecordingEmailSender::failing()),
            Arc::new(MutableClock::default()),
        );
        let users: Repository<User> = collections.repository();
        users.insert(&user("Ana", "ana@example.com")).await.expect("ana");

        announcer
            .announce(Announcement {
                title: "t".into(),
                body: "b".into(),
                link: None,
            })
            .await
            .expect("best effort");
    }
}
