//! Moderated community content: events, gallery posts, job postings and
//! donations.
//!
//! Each kind is submitted as a draft, validated, and stored with a
//! [`ModerationStatus`]. Only approved content is publicly visible.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::Error;
use super::image::InlineImage;
use super::record::{Collection, Record, impl_record};

/// Approval state gating public visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Kinds of moderated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Event,
    Gallery,
    Job,
    Donation,
}

impl ContentKind {
    /// Human-readable singular noun.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Gallery => "gallery post",
            Self::Job => "job posting",
            Self::Donation => "donation",
        }
    }
}

/// Text shown to everyone when content is approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

/// Behaviour shared by every moderated content kind.
pub trait Moderated: Record {
    /// Submission and update payload.
    type Draft: DeserializeOwned + Send + Sync + 'static;

    const KIND: ContentKind;

    /// Build a new record from a validated draft.
    fn from_draft(
        draft: Self::Draft,
        submitted_by: Uuid,
        status: ModerationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, Error>;

    /// Overwrite the editable fields from a validated draft.
    fn apply_draft(&mut self, draft: Self::Draft) -> Result<(), Error>;

    fn status(&self) -> ModerationStatus;

    fn set_status(&mut self, status: ModerationStatus);

    fn submitted_by(&self) -> Uuid;

    /// Short line used in live toasts.
    fn headline(&self) -> String;

    /// Notification broadcast when the record becomes approved.
    fn announcement(&self) -> Option<Announcement> {
        None
    }
}

fn required_text(field: &str, value: &str, max: usize) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(Error::invalid_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

const TITLE_MAX: usize = 200;
const BODY_MAX: usize = 10_000;

// Events ---------------------------------------------------------------------

/// Association event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub cover_image: Option<InlineImage>,
    pub status: ModerationStatus,
    pub submitted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(Event, Collection::Events);

/// Editable event fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_image: Option<InlineImage>,
}

struct ValidEvent {
    title: String,
    description: String,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    cover_image: Option<InlineImage>,
}

impl EventDraft {
    fn validate(self) -> Result<ValidEvent, Error> {
        if self.ends_at.is_some_and(|end| end < self.starts_at) {
            return Err(Error::invalid_request("event must not end before it starts"));
        }
        Ok(ValidEvent {
            title: required_text("title", &self.title, TITLE_MAX)?,
            description: required_text("description", &self.description, BODY_MAX)?,
            location: optional_text(self.location),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            cover_image: self.cover_image,
        })
    }
}

impl Moderated for Event {
    type Draft = EventDraft;
    const KIND: ContentKind = ContentKind::Event;

    fn from_draft(
        draft: EventDraft,
        submitted_by: Uuid,
        status: ModerationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let valid = draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: valid.title,
            description: valid.description,
            location: valid.location,
            starts_at: valid.starts_at,
            ends_at: valid.ends_at,
            cover_image: valid.cover_image,
            status,
            submitted_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn apply_draft(&mut self, draft: EventDraft) -> Result<(), Error> {
        let valid = draft.validate()?;
        self.title = valid.title;
        self.description = valid.description;
        self.location = valid.location;
        self.starts_at = valid.starts_at;
        self.ends_at = valid.ends_at;
        self.cover_image = valid.cover_image;
        Ok(())
    }

    fn status(&self) -> ModerationStatus {
        self.status
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = status;
    }

    fn submitted_by(&self) -> Uuid {
        self.submitted_by
    }

    fn headline(&self) -> String {
        format!("New event: {}", self.title)
    }

    fn announcement(&self) -> Option<Announcement> {
        let when = self.starts_at.format("%B %-d, %Y %H:%M UTC");
        let body = match &self.location {
            Some(location) => format!("{} on {when} at {location}.", self.title),
            None => format!("{} on {when}.", self.title),
        };
        Some(Announcement {
            title: format!("New event: {}", self.title),
            body,
            link: Some(format!("/events/{}", self.id)),
        })
    }
}

// Gallery --------------------------------------------------------------------

/// Photo album post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPost {
    pub id: Uuid,
    pub title: String,
    pub caption: Option<String>,
    pub album: Option<String>,
    pub images: Vec<InlineImage>,
    pub status: ModerationStatus,
    pub submitted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(GalleryPost, Collection::GalleryItems);

/// Editable gallery fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDraft {
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    pub images: Vec<InlineImage>,
}

/// Most images accepted in one gallery post.
pub const GALLERY_IMAGES_MAX: usize = 20;

impl GalleryDraft {
    fn validate(self) -> Result<Self, Error> {
        if self.images.is_empty() {
            return Err(Error::invalid_request("gallery post needs at least one image"));
        }
        if self.images.len() > GALLERY_IMAGES_MAX {
            return Err(Error::invalid_request(format!(
                "gallery post may hold at most {GALLERY_IMAGES_MAX} images"
            )));
        }
        Ok(Self {
            title: required_text("title", &self.title, TITLE_MAX)?,
            caption: optional_text(self.caption),
            album: optional_text(self.album),
            images: self.images,
        })
    }
}

impl Moderated for GalleryPost {
    type Draft = GalleryDraft;
    const KIND: ContentKind = ContentKind::Gallery;

    fn from_draft(
        draft: GalleryDraft,
        submitted_by: Uuid,
        status: ModerationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let valid = draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: valid.title,
            caption: valid.caption,
            album: valid.album,
            images: valid.images,
            status,
            submitted_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn apply_draft(&mut self, draft: GalleryDraft) -> Result<(), Error> {
        let valid = draft.validate()?;
        self.title = valid.title;
        self.caption = valid.caption;
        self.album = valid.album;
        self.images = valid.images;
        Ok(())
    }

    fn status(&self) -> ModerationStatus {
        self.status
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = status;
    }

    fn submitted_by(&self) -> Uuid {
        self.submitted_by
    }

    fn headline(&self) -> String {
        format!("New photos: {}", self.title)
    }
}

// Jobs -----------------------------------------------------------------------

/// Job opportunity shared with alumni.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub employment_type: Option<String>,
    pub apply_url: Option<String>,
    pub contact_email: Option<String>,
    pub status: ModerationStatus,
    pub submitted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(JobPosting, Collection::JobPostings);

/// Editable job fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub description: String,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub apply_url: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl JobDraft {
    fn validate(self) -> Result<Self, Error> {
        let apply_url = optional_text(self.apply_url);
        if let Some(link) = &apply_url {
            url::Url::parse(link)
                .map_err(|err| Error::invalid_request(format!("applyUrl is not a URL: {err}")))?;
        }
        let contact_email = optional_text(self.contact_email);
        if contact_email.as_deref().is_some_and(|email| !email.contains('@')) {
            return Err(Error::invalid_request("contactEmail must be an email address"));
        }
        Ok(Self {
            title: required_text("title", &self.title, TITLE_MAX)?,
            company: required_text("company", &self.company, TITLE_MAX)?,
            location: optional_text(self.location),
            description: required_text("description", &self.description, BODY_MAX)?,
            employment_type: optional_text(self.employment_type),
            apply_url,
            contact_email,
        })
    }
}

impl Moderated for JobPosting {
    type Draft = JobDraft;
    const KIND: ContentKind = ContentKind::Job;

    fn from_draft(
        draft: JobDraft,
        submitted_by: Uuid,
        status: ModerationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let valid = draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: valid.title,
            company: valid.company,
            location: valid.location,
            description: valid.description,
            employment_type: valid.employment_type,
            apply_url: valid.apply_url,
            contact_email: valid.contact_email,
            status,
            submitted_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn apply_draft(&mut self, draft: JobDraft) -> Result<(), Error> {
        let valid = draft.validate()?;
        self.title = valid.title;
        self.company = valid.company;
        self.location = valid.location;
        self.description = valid.description;
        self.employment_type = valid.employment_type;
        self.apply_url = valid.apply_url;
        self.contact_email = valid.contact_email;
        Ok(())
    }

    fn status(&self) -> ModerationStatus {
        self.status
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = status;
    }

    fn submitted_by(&self) -> Uuid {
        self.submitted_by
    }

    fn headline(&self) -> String {
        format!("New job: {} at {}", self.title, self.company)
    }
}

// Donations ------------------------------------------------------------------

/// Pledged or received donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub donor_name: String,
    pub amount_cents: u64,
    pub currency: String,
    pub message: Option<String>,
    pub anonymous: bool,
    pub status: ModerationStatus,
    pub submitted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(Donation, Collection::Donations);

/// Editable donation fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationDraft {
    pub donor_name: String,
    pub amount_cents: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

fn default_currency() -> String {
    "PHP".to_owned()
}

impl DonationDraft {
    fn validate(self) -> Result<Self, Error> {
        if self.amount_cents == 0 {
            return Err(Error::invalid_request("donation amount must be positive"));
        }
        let currency = self.currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::invalid_request(
                "currency must be a three-letter ISO code",
            ));
        }
        Ok(Self {
            donor_name: required_text("donorName", &self.donor_name, TITLE_MAX)?,
            amount_cents: self.amount_cents,
            currency,
            message: optional_text(self.message),
            anonymous: self.anonymous,
        })
    }
}

impl Donation {
    /// Name shown publicly, honouring the anonymity flag.
    #[must_use]
    pub fn public_name(&self) -> &str {
        if self.anonymous {
            "Anonymous"
        } else {
            self.donor_name.as_str()
        }
    }
}

impl Moderated for Donation {
    type Draft = DonationDraft;
    const KIND: ContentKind = ContentKind::Donation;

    fn from_draft(
        draft: DonationDraft,
        submitted_by: Uuid,
        status: ModerationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let valid = draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            donor_name: valid.donor_name,
            amount_cents: valid.amount_cents,
            currency: valid.currency,
            message: valid.message,
            anonymous: valid.anonymous,
            status,
            submitted_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn apply_draft(&mut self, draft: DonationDraft) -> Result<(), Error> {
        let valid = draft.validate()?;
        self.donor_name = valid.donor_name;
        self.amount_cents = valid.amount_cents;
        self.currency = valid.currency;
        self.message = valid.message;
        self.anonymous = valid.anonymous;
        Ok(())
    }

    fn status(&self) -> ModerationStatus {
        self.status
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = status;
    }

    fn submitted_by(&self) -> Uuid {
        self.submitted_by
    }

    fn headline(&self) -> String {
        let whole = self.amount_cents / 100;
        let cents = self.amount_cents % 100;
        format!(
            "{} donated {} {whole}.{cents:02}",
            self.public_name(),
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn event_draft() -> EventDraft {
        EventDraft {
            title: "  Homecoming ".into(),
            description: "Annual reunion".into(),
            location: Some("Main Hall".into()),
            starts_at: now(),
            ends_at: None,
            cover_image: None,
        }
    }

    #[test]
    fn event_draft_is_trimmed() {
        let event = Event::from_draft(event_draft(), Uuid::nil(), ModerationStatus::Pending, now())
            .expect("valid draft");
        assert_eq!(event.title, "Homecoming");
        assert_eq!(event.status(), ModerationStatus::Pending);
    }

    #[test]
    fn event_must_not_end_before_start() {
        let mut draft = event_draft();
        draft.ends_at = Some(now() - chrono::Duration::hours(1));
        let err = Event::from_draft(draft, Uuid::nil(), ModerationStatus::Pending, now())
            .expect_err("invalid range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn event_announcement_mentions_title_and_location() {
        let event = Event::from_draft(event_draft(), Uuid::nil(), ModerationStatus::Approved, now())
            .expect("valid draft");
        let announcement = event.announcement().expect("events announce");
        assert!(announcement.body.contains("Homecoming"));
        assert!(announcement.body.contains("Main Hall"));
    }

    #[test]
    fn gallery_requires_images() {
        let draft = GalleryDraft {
            title: "Reunion".into(),
            caption: None,
            album: None,
            images: Vec::new(),
        };
        let err = GalleryPost::from_draft(draft, Uuid::nil(), ModerationStatus::Pending, now())
            .expect_err("no images");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn job_rejects_malformed_apply_url() {
        let draft = JobDraft {
            title: "Engineer".into(),
            company: "Acme".into(),
            location: None,
            description: "Build things".into(),
            employment_type: None,
            apply_url: Some("not a url".into()),
            contact_email: None,
        };
        assert!(JobPosting::from_draft(draft, Uuid::nil(), ModerationStatus::Pending, now()).is_err());
    }

    #[test]
    fn donation_headline_respects_anonymity() {
        let draft = DonationDraft {
            donor_name: "Ana".into(),
            amount_cents: 150_050,
            currency: "php".into(),
            message: None,
            anonymous: true,
        };
        let donation = Donation::from_draft(draft, Uuid::nil(), ModerationStatus::Pending, now())
            .expect("valid donation");
        assert_eq!(donation.headline(), "Anonymous donated PHP 1500.50");
    }

    #[test]
    fn donation_requires_positive_amount() {
        let draft = DonationDraft {
            donor_name: "Ana".into(),
            amount_cents: 0,
            currency: "PHP".into(),
            message: None,
            anonymous: false,
        };
        assert!(Donation::from_draft(draft, Uuid::nil(), ModerationStatus::Pending, now()).is_err());
    }
}
