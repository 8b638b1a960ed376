use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chronicle::config::AppConfig;
use chronicle::draft::{CountryDraft, DraftModel};
use chronicle::models::dates::parse_instant;
use chronicle::models::Country;
use chronicle::session::{EditingSession, SaveError};
use chronicle::timeline::holders_at;
use chronicle::validate::{validate_semantics, validate_structure};
use chronicle::{api, db};

#[derive(Parser)]
#[command(name = "chron")]
#[command(about = "Edit and query the political timelines of countries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Chronicle server
    Serve {
        /// Port for HTTP API (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Report validation errors and warnings for a record file
    Check {
        /// Canonical country record (JSON)
        record: PathBuf,
    },
    /// Show who held office at a date
    Holders {
        /// Canonical country record (JSON)
        record: PathBuf,

        /// A date (YYYY-MM-DD) or RFC 3339 instant
        #[arg(long)]
        at: String,
    },
    /// Save a record file into the database through an editing session
    Import {
        /// Canonical country record (JSON)
        record: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "chronicle=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_record(path: &Path) -> anyhow::Result<Country> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn open_database(config: &AppConfig) -> anyhow::Result<db::Database> {
    let db = db::Database::open(config.database_path()?)?;
    db.migrate()?;
    Ok(db)
}

async fn serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting Chronicle server on port {}", port);

    let db = open_database(config)?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Chronicle server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn check(path: &Path) -> anyhow::Result<()> {
    let record = read_record(path)?;
    let draft = CountryDraft::from_record(&record);

    let errors = validate_structure(&draft);
    let warnings = validate_semantics(&draft);

    for error in &errors {
        println!("error: {}", error);
    }
    for warning in &warnings {
        println!("warning: {}", warning);
    }
    if errors.is_empty() && warnings.is_empty() {
        println!("{}: no problems found", record.name);
    }
    if !errors.is_empty() {
        anyhow::bail!("{} validation error(s)", errors.len());
    }
    Ok(())
}

fn holders(path: &Path, at: &str) -> anyhow::Result<()> {
    let record = read_record(path)?;
    let instant = parse_instant(at)
        .ok_or_else(|| anyhow::anyhow!("`{}` is not a date or RFC 3339 instant", at))?;

    let (president, monarch) = holders_at(&record, instant);
    println!(
        "President: {}",
        president.map(|p| p.name.as_str()).unwrap_or("-")
    );
    println!("Monarch: {}", monarch.map(|m| m.name.as_str()).unwrap_or("-"));
    Ok(())
}

async fn import(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let record = read_record(path)?;
    let db = open_database(config)?;

    // Records unknown to this database are created fresh.
    let existing = db.get_country(record.id)?;
    let baseline = existing
        .as_ref()
        .map(CountryDraft::from_record)
        .unwrap_or_default();
    let incoming = CountryDraft {
        id: existing.as_ref().map(|country| country.id),
        ..CountryDraft::from_record(&record)
    };

    let model = DraftModel::with_capacity(baseline, config.history_capacity);
    let mut session = EditingSession::new(model, config.autosave_idle());
    session.apply_change(|draft| *draft = incoming, Instant::now());

    for warning in session.warnings() {
        println!("warning: {}", warning);
    }

    match session.save(&db).await {
        Ok(country) => {
            println!("Saved {} ({})", country.code, country.id);
            Ok(())
        }
        Err(SaveError::Invalid(errors)) => {
            for error in &errors {
                println!("error: {}", error);
            }
            anyhow::bail!("{} validation error(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();

    match cli.command {
        Some(Commands::Serve { port }) => serve(&config, port.unwrap_or(config.port)).await,
        Some(Commands::Check { record }) => check(&record),
        Some(Commands::Holders { record, at }) => holders(&record, &at),
        Some(Commands::Import { record }) => import(&config, &record).await,
        // Default: start server
        None => serve(&config, config.port).await,
    }
}
