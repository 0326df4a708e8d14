//! Configuration module.
//!
//! Structured configuration loaded from environment variables (a `.env` file
//! is honoured by the binaries), organized by concern: storage, scraping and
//! training.

mod scraper_config;
mod storage_config;
mod training_config;

pub use scraper_config::ScraperEnvConfig;
pub use storage_config::StorageEnvConfig;
pub use training_config::TrainingEnvConfig;

use crate::application::ml::grid_search::HyperparameterGrid;
use anyhow::{Context, Result};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub storage: StorageEnvConfig,
    pub scraper: ScraperEnvConfig,
    pub training: TrainingEnvConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            storage: StorageEnvConfig::from_env(),
            scraper: ScraperEnvConfig::from_env().context("Failed to load scraper config")?,
            training: TrainingEnvConfig::from_env().context("Failed to load training config")?,
        })
    }
}

/// Grid from `path` when given, otherwise the default grid.
pub fn load_grid(path: Option<&Path>) -> Result<HyperparameterGrid> {
    match path {
        Some(p) => HyperparameterGrid::from_toml_file(p),
        None => Ok(HyperparameterGrid::default()),
    }
}
