//! Computes the feature vector for a target date from the stored history.
//!
//! The output `{"target_date", "features"}` can be piped into `predict`.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use doublecast::application::features;
use doublecast::config::StorageEnvConfig;
use doublecast::domain::repositories::DrawRepository;
use doublecast::infrastructure::observability::init_logging;
use doublecast::infrastructure::{Database, SqliteDrawRepository};
use serde_json::json;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute features for a target date", long_about = None)]
struct Args {
    /// Target date (YYYY-MM-DD); defaults to the day after the latest stored draw
    #[arg(long)]
    date: Option<NaiveDate>,

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

async fn run(args: Args) -> Result<serde_json::Value> {
    let mut storage = StorageEnvConfig::from_env();
    if let Some(url) = args.database_url {
        storage.database_url = url;
    }
    let db = Database::new(&storage.database_url).await?;
    let repository = SqliteDrawRepository::new(db.pool);

    let target = match args.date {
        Some(date) => date,
        None => match repository.latest().await? {
            Some(latest) => latest
                .date
                .checked_add_days(Days::new(1))
                .context("Target date out of range")?,
            None => Utc::now().date_naive(),
        },
    };

    let history = repository.find_before(target).await?;
    info!("Featurizing {} from {} prior draws", target, history.len());
    let vector = features::compute(&history, target);

    Ok(json!({
        "target_date": target.to_string(),
        "features": vector.to_named(),
    }))
}
