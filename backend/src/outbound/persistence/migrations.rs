//! Embedded schema migrations, applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while bringing the schema up to date.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    #[error("migration task aborted: {0}")]
    Join(String),
}

/// Apply pending migrations on a blocking thread.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| MigrationError::Connection(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply(err.to_string()))?;
        info!(count = applied.len(), "database migrations applied");
        Ok(())
    })
    .await
    .map_err(|err| MigrationError::Join(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use diesel::pg::Pg;
    use diesel::migration::MigrationSource;

    use super::MIGRATIONS;

    #[test]
    fn alumni_id_index_follows_documents_table() {
        let names: Vec<String> = MigrationSource::<Pg>::migrations(&MIGRATIONS)
            .expect("embedded migrations")
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();
        let table = names.iter().position(|name| name.ends_with("create_documents"));
        let index = names.iter().position(|name| name.ends_with("unique_alumni_ids"));
        assert!(matches!((table, index), (Some(table), Some(index)) if table < index));
    }
}
