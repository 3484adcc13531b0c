//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the alumni platform's business rules independently of
//! transport and storage. Entities are stored as documents through the
//! [`ports::DocumentStore`] port and every service takes its collaborators
//! as trait objects so adapters can be swapped in tests.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Entities: users, alumni records, officer positions, moderated content,
//!   notifications, landing and settings singletons, contact messages.
//! - Services: identity resolution, profile and role management, alumni
//!   registry and CSV import, officers, moderation, notifications, site
//!   configuration, password resets and the live toast feed.

pub mod ports;

mod alumni;
mod alumni_id;
mod alumni_service;
mod auth;
mod contact;
mod content;
mod content_service;
mod csv_import;
mod error;
mod identity;
mod image;
mod landing;
mod live;
mod names;
mod notification;
mod notification_service;
mod officer;
mod officer_service;
mod password_reset;
mod record;
mod repository;
mod site_service;
mod trace_id;
mod user;
mod user_service;

pub use self::alumni::AlumniRecord;
pub use self::alumni_id::{AlumniId, AlumniIdError, PLACEHOLDER_EMAIL_DOMAIN, is_placeholder_email};
pub use self::alumni_service::{AlumniDraft, AlumniFilter, AlumniService, BATCH_YEAR_RANGE};
pub use self::auth::{CandidateSource, LoginAttempt, LoginCandidate, LoginOutcome};
pub use self::contact::{ContactDraft, ContactMessage};
pub use self::content::{
    Announcement, ContentKind, Donation, DonationDraft, Event, EventDraft, GALLERY_IMAGES_MAX,
    GalleryDraft, GalleryPost, JobDraft, JobPosting, Moderated, ModerationStatus,
};
pub use self::content_service::{ContentService, Submitter};
pub use self::csv_import::{ImportReport, RosterEntry, read_roster};
pub use self::error::{Error, ErrorCode};
pub use self::identity::IdentityService;
pub use self::image::{INLINE_IMAGE_MAX_BYTES, InlineImage, InlineImageError};
pub use self::landing::{
    LANDING_CONFIG_ID, LandingConfig, LandingDraft, SYSTEM_SETTINGS_ID, SettingsDraft,
    SystemSettings,
};
pub use self::live::{LiveToastFeed, SnapshotWatermark, Toast, ToastKind, ToastSubscription};
pub use self::names::{NameError, PERSON_NAME_MAX, clean_person_name, normalize_email, normalize_name};
pub use self::notification::{Notification, NotificationDraft, NotificationView};
pub use self::notification_service::{Announcer, NotificationService};
pub use self::officer::{BATCH_PRESIDENT, OfficerPosition, is_batch_president_title};
pub use self::officer_service::{OfficerDraft, OfficerService};
pub use self::password_reset::{PasswordResetService, PasswordResetToken, RESET_TOKEN_TTL_SECS};
pub use self::record::{Collection, Record};
pub use self::repository::{Collections, Repository, to_filter_value};
pub use self::site_service::SiteService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{OfficerSnapshot, Role, SocialLinks, User, UserProfile};
pub use self::user_service::{AdminSeed, PASSWORD_MIN_CHARS, ProfileUpdate, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
