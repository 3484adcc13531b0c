//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` endpoint, the health probes, the
//! request and response schemas, and the session cookie security scheme.
//! Swagger UI serves it in debug builds and `openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Alumni association API",
        description = "Public content, member directory, admin console and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::request_password_reset,
        crate::inbound::http::auth::confirm_password_reset,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::follow_user,
        crate::inbound::http::users::unfollow_user,
        crate::inbound::http::users::admin_list_users,
        crate::inbound::http::users::admin_delete_user,
        crate::inbound::http::users::admin_set_role,
        crate::inbound::http::alumni::list_alumni,
        crate::inbound::http::alumni::create_alumni,
        crate::inbound::http::alumni::import_alumni,
        crate::inbound::http::alumni::get_alumni,
        crate::inbound::http::alumni::update_alumni,
        crate::inbound::http::alumni::delete_alumni,
        crate::inbound::http::alumni::link_alumni,
        crate::inbound::http::officers::list_officers,
        crate::inbound::http::officers::admin_list_officers,
        crate::inbound::http::officers::create_officer,
        crate::inbound::http::officers::update_officer,
        crate::inbound::http::officers::delete_officer,
        crate::inbound::http::content::events::list_published,
        crate::inbound::http::content::events::show,
        crate::inbound::http::content::events::submit,
        crate::inbound::http::content::events::list_all,
        crate::inbound::http::content::events::update,
        crate::inbound::http::content::events::remove,
        crate::inbound::http::content::events::moderate,
        crate::inbound::http::content::gallery::list_published,
        crate::inbound::http::content::gallery::show,
        crate::inbound::http::content::gallery::submit,
        crate::inbound::http::content::gallery::list_all,
        crate::inbound::http::content::gallery::update,
        crate::inbound::http::content::gallery::remove,
        crate::inbound::http::content::gallery::moderate,
        crate::inbound::http::content::jobs::list_published,
        crate::inbound::http::content::jobs::show,
        crate::inbound::http::content::jobs::submit,
        crate::inbound::http::content::jobs::list_all,
        crate::inbound::http::content::jobs::update,
        crate::inbound::http::content::jobs::remove,
        crate::inbound::http::content::jobs::moderate,
        crate::inbound::http::content::donations::list_published,
        crate::inbound::http::content::donations::show,
        crate::inbound::http::content::donations::submit,
        crate::inbound::http::content::donations::list_all,
        crate::inbound::http::content::donations::update,
        crate::inbound::http::content::donations::remove,
        crate::inbound::http::content::donations::moderate,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::site::get_landing,
        crate::inbound::http::site::replace_landing,
        crate::inbound::http::site::get_settings,
        crate::inbound::http::site::replace_settings,
        crate::inbound::http::site::submit_contact,
        crate::inbound::http::site::list_contact_messages,
        crate::inbound::http::site::mark_contact_handled,
        crate::inbound::http::site::delete_contact_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::AlumniId,
        crate::domain::AlumniRecord,
        crate::domain::AlumniDraft,
        crate::domain::ImportReport,
        crate::domain::Role,
        crate::domain::UserProfile,
        crate::domain::SocialLinks,
        crate::domain::OfficerSnapshot,
        crate::domain::ProfileUpdate,
        crate::domain::LoginCandidate,
        crate::domain::CandidateSource,
        crate::domain::OfficerPosition,
        crate::domain::OfficerDraft,
        crate::domain::ModerationStatus,
        crate::domain::ContentKind,
        crate::domain::Event,
        crate::domain::EventDraft,
        crate::domain::GalleryPost,
        crate::domain::GalleryDraft,
        crate::domain::JobPosting,
        crate::domain::JobDraft,
        crate::domain::Donation,
        crate::domain::DonationDraft,
        crate::domain::InlineImage,
        crate::domain::Notification,
        crate::domain::NotificationDraft,
        crate::domain::NotificationView,
        crate::domain::LandingConfig,
        crate::domain::LandingDraft,
        crate::domain::SystemSettings,
        crate::domain::SettingsDraft,
        crate::domain::ContactMessage,
        crate::domain::ContactDraft,
        crate::domain::Toast,
        crate::domain::ToastKind,
        crate::inbound::http::auth::LoginRequest,
        crate::inbound::http::auth::LoginResponse,
        crate::inbound::http::auth::PasswordResetRequest,
        crate::inbound::http::auth::PasswordResetConfirmation,
        crate::inbound::http::users::PasswordChange,
        crate::inbound::http::users::RoleChange,
        crate::inbound::http::alumni::AlumniImportRequest,
        crate::inbound::http::alumni::AlumniLink,
        crate::inbound::http::content::ModerationChange,
    )),
    tags(
        (name = "auth", description = "Login, logout and password resets"),
        (name = "users", description = "Member profiles and follows"),
        (name = "admin", description = "Administrator console; requires the admin role"),
        (name = "officers", description = "Batch officer positions"),
        (name = "events", description = "Event listings"),
        (name = "gallery", description = "Photo gallery"),
        (name = "jobs", description = "Job board"),
        (name = "donations", description = "Donation drives"),
        (name = "notifications", description = "In-app notifications"),
        (name = "site", description = "Landing page, settings and contact form"),
        (name = "health", description = "Kubernetes probes")
    )
)]
pub struct ApiDoc;
