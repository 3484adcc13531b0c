//! Backend entry-point: loads settings, wires adapters and serves HTTP.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use backend::settings::{AppSettings, SettingsError};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let config = build_config(&settings, session).await?;

    let health_state = web::Data::new(HealthState::new());
    info!(host = settings.host(), port = settings.port(), "starting server");
    create_server(health_state, config).await?.await
}

async fn build_config(
    settings: &AppSettings,
    session: SessionSettings,
) -> std::io::Result<ServerConfig> {
    let invalid = |err: SettingsError| std::io::Error::other(err);
    let mut config = ServerConfig::new(
        session,
        (settings.host().to_owned(), settings.port()),
        settings.password_reset_url(),
    )
    .with_allowed_origins(settings.allowed_origins())
    .with_admin_seed(settings.admin_seed().map_err(invalid)?);

    if let Some(email) = settings.email_config().map_err(invalid)? {
        config = config.with_email(email, settings.email_timeout());
    }

    if let Some(url) = settings.database_url() {
        run_migrations(url).await.map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    Ok(config)
}
