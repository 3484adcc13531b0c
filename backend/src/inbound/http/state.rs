//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data`. Services are built once from
//! the driven ports so handlers never touch adapters directly.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{EmailSender, LoginService, PasswordHasher};
use crate::domain::{
    AlumniService, Announcer, Collections, ContentService, Donation, Event, GalleryPost,
    IdentityService, JobPosting, NotificationService, OfficerService, PasswordResetService,
    SiteService, UserService,
};

/// Driven ports and settings needed to build [`HttpState`].
#[derive(Clone)]
pub struct HttpStatePorts {
    pub collections: Collections,
    pub hasher: Arc<dyn PasswordHasher>,
    pub email: Arc<dyn EmailSender>,
    pub clock: Arc<dyn Clock>,
    /// Page that receives `?token=` in password reset emails.
    pub password_reset_url: String,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: UserService,
    pub password_resets: PasswordResetService,
    pub alumni: AlumniService,
    pub officers: OfficerService,
    pub events: ContentService<Event>,
    pub gallery: ContentService<GalleryPost>,
    pub jobs: ContentService<JobPosting>,
    pub donations: ContentService<Donation>,
    pub notifications: NotificationService,
    pub site: SiteService,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            collections,
            hasher,
            email,
            clock,
            password_reset_url,
        } = ports;
        let announcer = Announcer::new(&collections, email.clone(), clock.clone());
        Self {
            login: Arc::new(IdentityService::new(
                &collections,
                hasher.clone(),
                clock.clone(),
            )),
            users: UserService::new(&collections, hasher.clone(), clock.clone()),
            password_resets: PasswordResetService::new(
                &collections,
                hasher,
                email,
                clock.clone(),
                password_reset_url,
            ),
            alumni: AlumniService::new(&collections, clock.clone()),
            officers: OfficerService::new(&collections, clock.clone()),
            events: ContentService::new(&collections, announcer.clone(), clock.clone()),
            gallery: ContentService::new(&collections, announcer.clone(), clock.clone()),
            jobs: ContentService::new(&collections, announcer.clone(), clock.clone()),
            donations: ContentService::new(&collections, announcer, clock.clone()),
            notifications: NotificationService::new(&collections, clock.clone()),
            site: SiteService::new(&collections, clock),
        }
    }

    /// Replace the login use-case, typically with a mock.
    #[must_use]
    pub fn with_login(mut self, login: Arc<dyn LoginService>) -> Self {
        self.login = login;
        self
    }
}
