//! Model Training Binary
//!
//! Reads the draw history, builds the leakage-free dataset, runs the
//! chronological grid search and writes a versioned model artifact.

use anyhow::{Context, Result};
use clap::Parser;
use doublecast::application::ml::dataset::LabeledDataset;
use doublecast::application::ml::trainer::TrainingPipeline;
use doublecast::config::{AppConfig, load_grid};
use doublecast::domain::repositories::DrawRepository;
use doublecast::infrastructure::observability::init_logging;
use doublecast::infrastructure::{Database, ModelStore, SqliteDrawRepository};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the double classifier", long_about = None)]
struct Args {
    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Directory for model artifacts (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Number of chronological folds (overrides CV_FOLDS)
    #[arg(long)]
    folds: Option<usize>,

    /// Minimum dataset size (overrides MIN_TRAINING_SAMPLES)
    #[arg(long)]
    min_samples: Option<usize>,

    /// Sampling seed (overrides TRAINING_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with the hyperparameter grid (overrides GRID_CONFIG).
    /// Without one the built-in 108-combination grid is searched, which fits
    /// hundreds of boosted models per fold and can run for hours; see
    /// grid.quick.toml for a small grid.
    #[arg(long)]
    grid_config: Option<PathBuf>,

    /// Also write the labeled dataset to this CSV file
    #[arg(long)]
    export_dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging("info");

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.storage.database_url = url;
    }
    if let Some(dir) = args.model_dir {
        config.storage.model_dir = dir;
    }
    if let Some(folds) = args.folds {
        config.training.folds = folds;
    }
    if let Some(min_samples) = args.min_samples {
        config.training.min_samples = min_samples;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if args.grid_config.is_some() {
        config.training.grid_config = args.grid_config;
    }

    let grid = load_grid(config.training.grid_config.as_deref())?;
    info!("Hyperparameter grid: {} combinations", grid.len());

    let db = Database::new(&config.storage.database_url).await?;
    let repository = SqliteDrawRepository::new(db.pool.clone());
    let history = repository
        .find_all()
        .await
        .context("Failed to load draw history")?;
    info!("Loaded {} draws", history.len());

    let dataset = LabeledDataset::from_history(&history);
    if let Some(path) = &args.export_dataset {
        dataset.export_csv(path)?;
    }

    let pipeline = TrainingPipeline::new(config.training.pipeline_config(), grid);
    let model = tokio::task::spawn_blocking(move || pipeline.run(&dataset))
        .await
        .context("Training task panicked")??;

    let store = ModelStore::new(&config.storage.model_dir);
    let saved = store.save(&model)?;
    let summary = model.summary();

    info!("Model saved to {:?}", saved.model_path);
    info!("Metadata saved to {:?}", saved.metadata_path);
    info!("Best parameters: {}", model.hyperparameters);
    info!(
        "Average top-1: {:.4}, top-3: {:.4}, top-5: {:.4}, log-loss: {:.4}",
        summary.avg_top1_acc, summary.avg_top3_acc, summary.avg_top5_acc, summary.avg_log_loss
    );

    Ok(())
}
