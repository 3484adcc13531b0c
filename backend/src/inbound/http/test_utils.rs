//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};

use super::session_config::SessionSettings;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::Collections;
use crate::test_support::{
    MutableClock, PlainPasswordHasher, RecordingEmailSender, in_memory_collections,
};

/// Session middleware with a fresh key and an insecure cookie for plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
    .middleware()
}

/// HTTP state over in-memory adapters, plus handles to inspect them.
pub struct TestHarness {
    pub state: HttpState,
    pub collections: Collections,
    pub email: Arc<RecordingEmailSender>,
    pub clock: Arc<MutableClock>,
}

pub fn test_harness() -> TestHarness {
    let collections = in_memory_collections();
    let email = Arc::new(RecordingEmailSender::default());
    let clock = Arc::new(MutableClock::default());
    let state = HttpState::new(HttpStatePorts {
        collections: collections.clone(),
        hasher: Arc::new(PlainPasswordHasher),
        email: email.clone(),
        clock: clock.clone(),
        password_reset_url: "https://alumni.example/reset".to_owned(),
    });
    TestHarness {
        state,
        collections,
        email,
        clock,
    }
}
