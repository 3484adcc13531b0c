//! Builders turning [`ServerConfig`] into adapter state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use backend::domain::ports::{EmailSender, PasswordHasher};
use backend::domain::{Collections, LiveToastFeed, UserService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::ws::state::WsState;
use backend::outbound::email::{EmailJsSender, LoggingEmailSender};
use backend::outbound::feed::BroadcastChangeFeed;
use backend::outbound::memory::InMemoryDocumentStore;
use backend::outbound::persistence::DieselDocumentStore;
use backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// States shared by every worker.
pub(crate) struct AppStates {
    pub http: HttpState,
    pub ws: WsState,
}

fn build_collections(config: &ServerConfig) -> Collections {
    let feed = Arc::new(BroadcastChangeFeed::default());
    match &config.db_pool {
        Some(pool) => Collections::new(Arc::new(DieselDocumentStore::new(pool.clone())), feed),
        None => {
            warn!("no database configured; data will not survive a restart");
            Collections::new(Arc::new(InMemoryDocumentStore::new()), feed)
        }
    }
}

fn build_email_sender(config: &ServerConfig) -> std::io::Result<Arc<dyn EmailSender>> {
    match &config.email {
        Some((email, timeout)) => EmailJsSender::new(email.clone(), *timeout)
            .map(|sender| Arc::new(sender) as Arc<dyn EmailSender>)
            .map_err(|err| std::io::Error::other(format!("email client: {err}"))),
        None => {
            info!("no email provider configured; emails will be logged");
            Ok(Arc::new(LoggingEmailSender))
        }
    }
}

/// Wire adapters into HTTP and WebSocket state, seeding the bootstrap
/// administrator when configured.
///
/// # Errors
/// Fails when the email client cannot be built or the admin seed is
/// rejected.
pub(crate) async fn build_states(config: &ServerConfig) -> std::io::Result<AppStates> {
    let collections = build_collections(config);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    if let Some(seed) = &config.admin_seed {
        UserService::new(&collections, hasher.clone(), clock.clone())
            .ensure_admin(seed)
            .await
            .map_err(|err| std::io::Error::other(format!("bootstrap admin: {err}")))?;
    }

    let http = HttpState::new(HttpStatePorts {
        collections: collections.clone(),
        hasher,
        email: build_email_sender(config)?,
        clock,
        password_reset_url: config.password_reset_url.clone(),
    });
    let ws = WsState::new(
        Arc::new(LiveToastFeed::new(&collections)),
        config.allowed_origins.iter(),
    );
    Ok(AppStates { http, ws })
}
