//! Scrapes the published chart.
//!
//! Without flags, emits the latest draw as one JSON line. `--save` also
//! appends it to the draw store; `--history` imports every valid draw on the
//! chart and emits an import summary instead. Failures are reported as
//! `{"error": ...}` with exit code 0.

use anyhow::{Context, Result};
use clap::Parser;
use doublecast::config::AppConfig;
use doublecast::domain::draw::DrawRecord;
use doublecast::domain::ports::DrawSource;
use doublecast::application::ingest::import_draws;
use doublecast::domain::repositories::DrawRepository;
use doublecast::infrastructure::observability::init_logging;
use doublecast::infrastructure::{ChartScraper, Database, SqliteDrawRepository};
use serde_json::{Value, json};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape the latest published draw", long_about = None)]
struct Args {
    /// Chart URL (overrides SCRAPE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Request timeout in seconds (overrides SCRAPE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Append the scraped draw to the draw store
    #[arg(long)]
    save: bool,

    /// Import the whole chart into the draw store
    #[arg(long, conflicts_with = "save")]
    history: bool,

    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging("warn");

    let args = Args::parse();
    let output = match run(args).await {
        Ok(value) => value,
        Err(e) => json!({ "error": format!("{:#}", e) }),
    };
    println!("{}", output);
}

async fn run(args: Args) -> Result<Value> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = args.url {
        config.scraper.url = url;
    }
    if let Some(timeout) = args.timeout_secs {
        config.scraper.timeout_secs = timeout;
    }
    if let Some(url) = args.database_url {
        config.storage.database_url = url;
    }

    let scraper = ChartScraper::new(config.scraper.url.clone(), config.scraper.timeout_secs)?;

    if args.history {
        let chart = scraper.fetch_chart().await?;
        let repository = open_store(&config.storage.database_url).await?;
        let summary = import_draws(&repository, &chart.records).await?;
        return Ok(json!({
            "imported": summary.imported,
            "skipped": summary.skipped() + chart.skipped,
        }));
    }

    let record = scraper.fetch_latest().await?;
    if args.save {
        let repository = open_store(&config.storage.database_url).await?;
        let outcome = repository
            .append(&record)
            .await
            .context("Failed to store scraped draw")?;
        info!("Stored draw {}: {:?}", record.draw_id(), outcome);
    }
    Ok(draw_json(&record))
}

async fn open_store(database_url: &str) -> Result<SqliteDrawRepository> {
    let db = Database::new(database_url).await?;
    Ok(SqliteDrawRepository::new(db.pool))
}

fn draw_json(record: &DrawRecord) -> Value {
    json!({
        "drawId": record.draw_id(),
        "datetime": record.date.format("%Y-%m-%dT00:00:00").to_string(),
        "number": record.double.value(),
        "tens": record.tens(),
        "units": record.units(),
        "rawSource": record.provenance.raw_source,
        "sourceUrl": record.provenance.source_url,
        "fetchedAt": record.provenance.fetched_at.to_rfc3339(),
    })
}
