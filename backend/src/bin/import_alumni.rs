//! Import an alumni roster CSV into the configured database.
//!
//! ```text
//! import-alumni --batch-year 2004 roster.csv
//! ```
//!
//! Connection settings come from the same `ALUMNI_*` environment as the
//! server.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use backend::domain::{AlumniService, Collections};
use backend::outbound::feed::BroadcastChangeFeed;
use backend::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig, run_migrations};
use backend::settings::AppSettings;
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;

#[derive(Debug, Parser)]
#[command(name = "import-alumni", about = "Import an alumni roster CSV")]
struct Cli {
    /// Batch year applied to every imported row.
    #[arg(long)]
    batch_year: i32,
    /// Roster CSV with a header row, then two people per row:
    /// `male name, -, male id, female name, -, female id`.
    path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.path)
        .wrap_err_with(|| format!("failed to read {}", cli.path.display()))?;
    let settings = AppSettings::load_from_iter([std::ffi::OsString::from("import-alumni")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let url = settings
        .database_url()
        .ok_or_else(|| eyre!("ALUMNI_DATABASE_URL must be set"))?;

    run_migrations(url).await.wrap_err("failed to migrate database")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .wrap_err("failed to connect to database")?;
    let collections = Collections::new(
        Arc::new(DieselDocumentStore::new(pool)),
        Arc::new(BroadcastChangeFeed::default()),
    );
    let report = AlumniService::new(&collections, Arc::new(DefaultClock))
        .import_csv(&text, cli.batch_year)
        .await
        .map_err(|err| eyre!("import failed: {err}"))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "imported {} row(s), skipped {}",
        report.imported, report.skipped
    )?;
    for message in &report.messages {
        writeln!(stdout, "  {message}")?;
    }
    Ok(())
}
