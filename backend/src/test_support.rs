//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::Collections;
use crate::domain::ports::{EmailMessage, EmailSendError, EmailSender, PasswordHashError, PasswordHasher};
use crate::outbound::feed::BroadcastChangeFeed;
use crate::outbound::memory::InMemoryDocumentStore;

/// Fixed instant used as "now" by test clocks.
#[must_use]
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single() {
        Some(at) => at,
        None => panic!("valid fixture timestamp"),
    }
}

/// Clock whose time only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_timestamp())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Email sender that keeps every message for later inspection.
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingEmailSender {
    /// Sender whose deliveries are recorded and then rejected.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("email mutex"),
        }
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSendError> {
        match self.sent.lock() {
            Ok(mut guard) => guard.push(message.clone()),
            Err(_) => panic!("email mutex"),
        }
        if self.fail {
            Err(EmailSendError::transport("recording sender set to fail"))
        } else {
            Ok(())
        }
    }
}

/// Cheap reversible "hash" so service tests avoid Argon2's cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        hash.strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing plain: prefix"))
    }
}

/// Collections over a fresh in-memory store and broadcast feed.
#[must_use]
pub fn in_memory_collections() -> Collections {
    Collections::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(BroadcastChangeFeed::default()),
    )
}
