//! Landing page content, system settings and contact messages.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use super::record::Record;
use super::repository::{Collections, Repository};
use super::user_service::validate_email;
use super::{
    ContactDraft, ContactMessage, Error, LANDING_CONFIG_ID, LandingConfig, LandingDraft,
    SYSTEM_SETTINGS_ID, SettingsDraft, SystemSettings, clean_person_name,
};

const SUBJECT_MAX: usize = 200;
const MESSAGE_MAX: usize = 5_000;
const MAINTENANCE_MAX: usize = 500;

/// Current settings, falling back to defaults when none are stored.
pub(crate) async fn current_settings(
    settings: &Repository<SystemSettings>,
    now: DateTime<Utc>,
) -> Result<SystemSettings, Error> {
    Ok(settings
        .find(SYSTEM_SETTINGS_ID)
        .await?
        .unwrap_or_else(|| SystemSettings::initial(now)))
}

/// Operations on `landing_config` and `contact_messages`.
#[derive(Clone)]
pub struct SiteService {
    landing: Repository<LandingConfig>,
    settings: Repository<SystemSettings>,
    contact: Repository<ContactMessage>,
    clock: Arc<dyn Clock>,
}

impl SiteService {
    pub fn new(collections: &Collections, clock: Arc<dyn Clock>) -> Self {
        Self {
            landing: collections.repository(),
            settings: collections.repository(),
            contact: collections.repository(),
            clock,
        }
    }

    pub async fn landing(&self) -> Result<LandingConfig, Error> {
        Ok(self
            .landing
            .find(LANDING_CONFIG_ID)
            .await?
            .unwrap_or_else(|| LandingConfig::initial(self.clock.utc())))
    }

    pub async fn replace_landing(&self, draft: LandingDraft) -> Result<LandingConfig, Error> {
        let hero_title = draft.hero_title.trim();
        if hero_title.is_empty() {
            return Err(Error::invalid_request("hero title must not be empty"));
        }
        let contact_email = match draft.contact_email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Some(validate_email(email)?),
            _ => None,
        };
        let mut config = self.landing().await?;
        config.hero_title = hero_title.to_owned();
        config.hero_subtitle = draft.hero_subtitle.trim().to_owned();
        config.hero_image = draft.hero_image;
        config.about = draft.about;
        config.mission = draft.mission;
        config.vision = draft.vision;
        config.contact_email = contact_email;
        config.phone = draft.phone;
        config.address = draft.address;
        config.social_links = draft.social_links;
        config.touch(self.clock.utc());
        self.landing.save(&config).await?;
        Ok(config)
    }

    pub async fn settings(&self) -> Result<SystemSettings, Error> {
        current_settings(&self.settings, self.clock.utc()).await
    }

    pub async fn replace_settings(&self, draft: SettingsDraft) -> Result<SystemSettings, Error> {
        let maintenance_message = draft
            .maintenance_message
            .map(|message| message.trim().to_owned())
            .filter(|message| !message.is_empty());
        if maintenance_message
            .as_deref()
            .is_some_and(|message| message.chars().count() > MAINTENANCE_MAX)
        {
            return Err(Error::invalid_request(format!(
                "maintenance message must be at most {MAINTENANCE_MAX} characters"
            )));
        }
        let mut settings = self.settings().await?;
        settings.submissions_require_approval = draft.submissions_require_approval;
        settings.donations_enabled = draft.donations_enabled;
        settings.maintenance_message = maintenance_message;
        settings.touch(self.clock.utc());
        self.settings.save(&settings).await?;
        Ok(settings)
    }

    pub async fn submit_contact(&self, draft: ContactDraft) -> Result<ContactMessage, Error> {
        let name =
            clean_person_name(&draft.name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let email = validate_email(&draft.email)?;
        let subject = draft.subject.trim();
        let message = draft.message.trim();
        if message.is_empty() {
            return Err(Error::invalid_request("message must not be empty"));
        }
        if subject.chars().count() > SUBJECT_MAX || message.chars().count() > MESSAGE_MAX {
            return Err(Error::invalid_request(format!(
                "subject is limited to {SUBJECT_MAX} and message to {MESSAGE_MAX} characters"
            )));
        }
        let now = self.clock.utc();
        let contact = ContactMessage {
            id: Uuid::new_v4(),
            name,
            email,
            subject: subject.to_owned(),
            message: message.to_owned(),
            handled: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.contact.insert(&contact).await?;
        Ok(contact)
    }

    /// Live contact messages, newest first.
    pub async fn list_contact(&self) -> Result<Vec<ContactMessage>, Error> {
        let mut messages = self.contact.list().await?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    pub async fn mark_handled(&self, id: Uuid) -> Result<ContactMessage, Error> {
        let mut message = self.contact.get(id).await?;
        message.handled = true;
        message.touch(self.clock.utc());
        self.contact.save(&message).await?;
        Ok(message)
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<(), Error> {
        let mut message = self.contact.get(id).await?;
        message.mark_deleted(self.clock.utc());
        self.contact.save(&message).await
    }
}
