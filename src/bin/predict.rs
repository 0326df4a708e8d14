//! Scores one feature request against a trained model.
//!
//! Emits exactly one JSON line on stdout. Exits 1 only when no model artifact
//! is available; every other failure is reported as `{"error": ...}` with
//! exit code 0.

use anyhow::{Context, Result};
use clap::Parser;
use doublecast::application::ml::scorer::{InferenceScorer, ScoreRequest};
use doublecast::config::StorageEnvConfig;
use doublecast::domain::errors::ModelError;
use doublecast::infrastructure::ModelStore;
use doublecast::infrastructure::observability::init_logging;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a feature request", long_about = None)]
struct Args {
    /// JSON request `{"features": {...}}`; read from stdin when absent
    #[arg(long)]
    request: Option<String>,

    /// Explicit model artifact (defaults to the latest in the model directory)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory searched for the latest model (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging("warn");

    let args = Args::parse();
    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", json!({ "error": format!("{:#}", e) }));
            if matches!(e.downcast_ref::<ModelError>(), Some(ModelError::NotFound { .. })) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn run(args: Args) -> Result<serde_json::Value> {
    let model = match &args.model {
        Some(path) => ModelStore::load(path)?,
        None => {
            let dir = args
                .model_dir
                .clone()
                .unwrap_or_else(|| StorageEnvConfig::from_env().model_dir);
            ModelStore::new(dir).load_latest()?
        }
    };
    let scorer = InferenceScorer::new(Arc::new(model))?;
    info!("Scoring with model {}", scorer.model_version());

    let raw = match args.request {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            buffer
        }
    };
    let request: ScoreRequest =
        serde_json::from_str(raw.trim()).context("Malformed request payload")?;

    let prediction = scorer.score_request(&request)?;
    Ok(serde_json::to_value(prediction)?)
}
