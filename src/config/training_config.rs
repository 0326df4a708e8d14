//! Training pipeline configuration parsing from environment variables.

use crate::application::ml::trainer::TrainingConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Training environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingEnvConfig {
    pub folds: usize,
    pub min_samples: usize,
    pub seed: u64,
    /// Optional TOML file overriding the default hyperparameter grid
    pub grid_config: Option<PathBuf>,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        let defaults = TrainingConfig::default();
        Self {
            folds: defaults.folds,
            min_samples: defaults.min_samples,
            seed: defaults.seed,
            grid_config: None,
        }
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            folds: parse_or(&lookup, "CV_FOLDS", defaults.folds)?,
            min_samples: parse_or(&lookup, "MIN_TRAINING_SAMPLES", defaults.min_samples)?,
            seed: parse_or(&lookup, "TRAINING_SEED", defaults.seed)?,
            grid_config: lookup("GRID_CONFIG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn pipeline_config(&self) -> TrainingConfig {
        TrainingConfig {
            folds: self.folds,
            min_samples: self.min_samples,
            seed: self.seed,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}
