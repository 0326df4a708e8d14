//! Training pipeline: precondition check, grid search, fold evaluation and
//! the final refit.

use super::classifier::{BoostingParams, GradientBoostedClassifier};
use super::cross_validation::{Fold, TimeSeriesSplit};
use super::dataset::LabeledDataset;
use super::grid_search::{HyperparameterGrid, grid_search, select_best};
use super::metrics::{FoldMetrics, MetricsSummary};
use super::model::{TrainedModel, version_for};
use crate::domain::errors::TrainingError;
use crate::domain::ml::feature_registry::schema_names;
use chrono::Utc;
use rayon::prelude::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub folds: usize,
    pub min_samples: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            min_samples: 60,
            seed: 42,
        }
    }
}

pub struct TrainingPipeline {
    config: TrainingConfig,
    grid: HyperparameterGrid,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig, grid: HyperparameterGrid) -> Self {
        Self { config, grid }
    }

    /// Smallest dataset this pipeline accepts.
    pub fn required_samples(&self) -> usize {
        let splitter_min = 2 * (self.config.folds + 1);
        self.config.min_samples.max(splitter_min)
    }

    pub fn run(&self, dataset: &LabeledDataset) -> Result<TrainedModel, TrainingError> {
        let splitter = TimeSeriesSplit::new(self.config.folds)?;
        let required = self.required_samples();
        if dataset.len() < required {
            return Err(TrainingError::InsufficientData {
                available: dataset.len(),
                required,
            });
        }

        let x = dataset.matrix();
        let y = &dataset.labels;
        let folds = splitter.split(dataset.len())?;
        info!(
            "Training on {} samples with {} chronological folds (test size {})",
            dataset.len(),
            folds.len(),
            folds.first().map(|f| f.test.len()).unwrap_or(0)
        );

        let combinations = self.grid.combinations();
        let results = grid_search(&x, y, &folds, &combinations, self.config.seed)?;
        let best = select_best(&results).ok_or_else(|| TrainingError::InvalidConfig {
            reason: "hyperparameter grid is empty".to_string(),
        })?;
        info!(
            "Best parameters: {} (mean log-loss {:.5})",
            best.params, best.mean_log_loss
        );

        let fold_metrics = evaluate_folds(&x, y, &folds, best.params, self.config.seed)?;
        for m in &fold_metrics {
            info!(
                "Fold {}: train={} test={} acc={:.4} log_loss={:.4} top1={:.4} top3={:.4} top5={:.4}",
                m.fold,
                m.train_size,
                m.test_size,
                m.accuracy,
                m.log_loss,
                m.top1_acc,
                m.top3_acc,
                m.top5_acc
            );
        }
        let summary = MetricsSummary::from_folds(&fold_metrics);
        info!(
            "Average: top1={:.4} top3={:.4} top5={:.4} log_loss={:.4}",
            summary.avg_top1_acc, summary.avg_top3_acc, summary.avg_top5_acc, summary.avg_log_loss
        );

        info!("Refitting on full dataset");
        let classifier = GradientBoostedClassifier::fit(&x, y, best.params, self.config.seed)?;

        let created_at = Utc::now();
        Ok(TrainedModel {
            version: version_for(created_at),
            created_at,
            feature_names: schema_names(),
            hyperparameters: best.params,
            fold_metrics,
            classifier,
        })
    }
}

fn evaluate_folds(
    x: &[Vec<f64>],
    y: &[u8],
    folds: &[Fold],
    params: BoostingParams,
    seed: u64,
) -> Result<Vec<FoldMetrics>, TrainingError> {
    folds
        .par_iter()
        .map(|fold| {
            let model = GradientBoostedClassifier::fit(
                &x[fold.train.clone()],
                &y[fold.train.clone()],
                params,
                seed,
            )?;
            let probs = model
                .predict_proba(&x[fold.test.clone()])
                .map_err(|e| TrainingError::Classifier {
                    reason: e.to_string(),
                })?;
            Ok(FoldMetrics::evaluate(
                fold.index,
                fold.train.len(),
                &probs,
                &y[fold.test.clone()],
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::{FEATURE_COUNT, FeatureId, FeatureVector};

    fn tiny_grid() -> HyperparameterGrid {
        HyperparameterGrid {
            max_depth: vec![2],
            learning_rate: vec![0.1],
            n_estimators: vec![2],
            subsample: vec![1.0],
            colsample_bytree: vec![1.0],
        }
    }

    fn synthetic(n: usize) -> LabeledDataset {
        let mut dataset = LabeledDataset::default();
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..n {
            let mut fv = FeatureVector::default();
            let label = (i % 4) as u8 * 11;
            fv.set(FeatureId::DoubleTens, (label / 10) as f64);
            dataset.dates.push(start + chrono::Days::new(i as u64));
            dataset.features.push(fv);
            dataset.labels.push(label);
        }
        dataset
    }

    #[test]
    fn test_refuses_insufficient_data() {
        let pipeline = TrainingPipeline::new(TrainingConfig::default(), tiny_grid());
        let err = pipeline.run(&synthetic(10)).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::InsufficientData {
                available: 10,
                required: 60
            }
        ));
    }

    #[test]
    fn test_refuses_single_fold() {
        let config = TrainingConfig {
            folds: 1,
            min_samples: 1,
            seed: 0,
        };
        let pipeline = TrainingPipeline::new(config, tiny_grid());
        assert!(matches!(
            pipeline.run(&synthetic(30)),
            Err(TrainingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_required_samples_respects_fold_count() {
        let config = TrainingConfig {
            folds: 5,
            min_samples: 4,
            seed: 0,
        };
        assert_eq!(TrainingPipeline::new(config, tiny_grid()).required_samples(), 12);
    }

    #[test]
    fn test_run_produces_complete_model() {
        let config = TrainingConfig {
            folds: 3,
            min_samples: 20,
            seed: 7,
        };
        let model = TrainingPipeline::new(config, tiny_grid())
            .run(&synthetic(40))
            .unwrap();

        assert_eq!(model.feature_names.len(), FEATURE_COUNT);
        assert_eq!(model.fold_metrics.len(), 3);
        assert_eq!(model.hyperparameters.max_depth, 2);
        for m in &model.fold_metrics {
            assert_eq!(m.test_size, 10);
            assert!(m.top1_acc <= m.top3_acc && m.top3_acc <= m.top5_acc);
        }
        assert_eq!(model.version.len(), "20240105_093000_000".len());
    }
}
