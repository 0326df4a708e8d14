//! Trained model artifact and its metadata sidecar.

use super::classifier::{BoostingParams, GradientBoostedClassifier};
use super::metrics::{FoldMetrics, MetricsSummary};
use super::predictor::DoublePredictor;
use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag format; lexicographic order matches creation order.
pub const VERSION_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

pub fn version_for(created_at: DateTime<Utc>) -> String {
    created_at.format(VERSION_FORMAT).to_string()
}

/// Immutable output of one training run
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub hyperparameters: BoostingParams,
    pub fold_metrics: Vec<FoldMetrics>,
    pub classifier: GradientBoostedClassifier,
}

impl TrainedModel {
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from_folds(&self.fold_metrics)
    }

    /// Sidecar describing this model, pointing at `model_path`.
    pub fn metadata(&self, model_path: &str) -> ModelMetadata {
        let summary = self.summary();
        ModelMetadata {
            timestamp: self.version.clone(),
            created_at: self.created_at,
            model_path: model_path.to_string(),
            best_params: self.hyperparameters,
            feature_names: self.feature_names.clone(),
            cv_scores: self.fold_metrics.clone(),
            avg_top1_acc: summary.avg_top1_acc,
            avg_top3_acc: summary.avg_top3_acc,
            avg_top5_acc: summary.avg_top5_acc,
            avg_log_loss: summary.avg_log_loss,
        }
    }
}

impl DoublePredictor for TrainedModel {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.classifier.predict_proba_one(features.as_slice())
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn name(&self) -> &str {
        "gradient_boosted_trees"
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// JSON sidecar written next to every model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
    pub model_path: String,
    pub best_params: BoostingParams,
    pub feature_names: Vec<String>,
    pub cv_scores: Vec<FoldMetrics>,
    pub avg_top1_acc: f64,
    pub avg_top3_acc: f64,
    pub avg_top5_acc: f64,
    pub avg_log_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_version_format_sorts_chronologically() {
        let a = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap();
        assert_eq!(version_for(a), "20240105_093000_000");
        assert!(version_for(a) < version_for(b));
    }
}
