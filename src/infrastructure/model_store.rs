//! Versioned model artifacts on disk.
//!
//! Each training run writes `double_model_{version}.json` and a sidecar
//! `model_metadata_{version}.json`. Versions sort lexicographically in
//! creation order, so "latest" is the greatest version present. Artifacts are
//! never overwritten.

use crate::application::ml::model::{ModelMetadata, TrainedModel};
use crate::domain::errors::ModelError;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MODEL_PREFIX: &str = "double_model_";
const METADATA_PREFIX: &str = "model_metadata_";
const EXTENSION: &str = ".json";

/// Paths written for one saved model
#[derive(Debug, Clone, PartialEq)]
pub struct SavedArtifact {
    pub model_path: PathBuf,
    pub metadata_path: PathBuf,
}

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", MODEL_PREFIX, version, EXTENSION))
    }

    pub fn metadata_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", METADATA_PREFIX, version, EXTENSION))
    }

    /// Write the model and its sidecar. Fails if either file already exists.
    pub fn save(&self, model: &TrainedModel) -> Result<SavedArtifact> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create model directory {:?}", self.dir))?;

        let model_path = self.model_path(&model.version);
        let metadata_path = self.metadata_path(&model.version);
        for path in [&model_path, &metadata_path] {
            if path.exists() {
                return Err(ModelError::AlreadyExists {
                    path: path.display().to_string(),
                }
                .into());
            }
        }

        let metadata = model.metadata(&model_path.display().to_string());
        write_pair(&model_path, model, &metadata_path, &metadata)?;

        info!("Saved model {} to {:?}", model.version, model_path);
        Ok(SavedArtifact {
            model_path,
            metadata_path,
        })
    }

    /// Versions present in the directory, ascending.
    pub fn versions(&self) -> Result<Vec<String>, ModelError> {
        let entries = fs::read_dir(&self.dir).map_err(|_| ModelError::NotFound {
            location: self.dir.display().to_string(),
        })?;
        let mut versions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let version = name.strip_prefix(MODEL_PREFIX)?.strip_suffix(EXTENSION)?;
                (!version.is_empty()).then(|| version.to_string())
            })
            .collect();
        versions.sort();
        Ok(versions)
    }

    pub fn latest_path(&self) -> Result<PathBuf, ModelError> {
        let latest = self
            .versions()?
            .pop()
            .ok_or_else(|| ModelError::NotFound {
                location: self.dir.display().to_string(),
            })?;
        Ok(self.model_path(&latest))
    }

    pub fn load_latest(&self) -> Result<TrainedModel, ModelError> {
        let path = self.latest_path()?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<TrainedModel, ModelError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ModelError::NotFound {
                location: path.display().to_string(),
            },
            _ => ModelError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        let model: TrainedModel =
            serde_json::from_str(&content).map_err(|e| ModelError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!("Loaded model {} from {:?}", model.version, path);
        Ok(model)
    }

    pub fn load_metadata(&self, version: &str) -> Result<ModelMetadata> {
        let path = self.metadata_path(version);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read model metadata {:?}", path))?;
        serde_json::from_str(&content).context("Failed to parse model metadata JSON")
    }
}

/// Write the model then its sidecar. A model file whose sidecar could not be
/// written is removed so that latest-version discovery never selects it.
fn write_pair<M: Serialize, S: Serialize>(
    model_path: &Path,
    model: &M,
    metadata_path: &Path,
    metadata: &S,
) -> Result<()> {
    write_new(model_path, model)?;
    if let Err(e) = write_new(metadata_path, metadata) {
        if let Err(cleanup) = fs::remove_file(model_path) {
            warn!("Failed to remove orphaned model {:?}: {}", model_path, cleanup);
        }
        return Err(e);
    }
    Ok(())
}

fn write_new<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| -> anyhow::Error {
            if e.kind() == ErrorKind::AlreadyExists {
                ModelError::AlreadyExists {
                    path: path.display().to_string(),
                }
                .into()
            } else {
                anyhow::Error::new(e).context(format!("Failed to create {:?}", path))
            }
        })?;
    let content = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
