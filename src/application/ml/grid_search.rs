//! Exhaustive hyperparameter search under chronological cross-validation.
//!
//! Every (combination, fold) pair is an independent task run on the rayon
//! pool. Results are collected before any aggregation, and the winner is the
//! lowest mean log-loss with ties going to the earlier combination.

use super::classifier::{BoostingParams, GradientBoostedClassifier};
use super::cross_validation::Fold;
use super::metrics::log_loss;
use crate::domain::errors::TrainingError;
use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameter grid for the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterGrid {
    pub max_depth: Vec<u16>,
    pub learning_rate: Vec<f64>,
    pub n_estimators: Vec<usize>,
    pub subsample: Vec<f64>,
    pub colsample_bytree: Vec<f64>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            max_depth: vec![3, 5, 7],
            learning_rate: vec![0.01, 0.1, 0.2],
            n_estimators: vec![100, 200, 300],
            subsample: vec![0.8, 1.0],
            colsample_bytree: vec![0.8, 1.0],
        }
    }
}

impl HyperparameterGrid {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse grid config TOML")
    }

    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid config file: {:?}", path))?;
        Self::from_toml_str(&content)
    }

    /// All combinations in declaration order; the last field varies fastest.
    pub fn combinations(&self) -> Vec<BoostingParams> {
        let mut combinations = Vec::new();
        for &max_depth in &self.max_depth {
            for &learning_rate in &self.learning_rate {
                for &n_estimators in &self.n_estimators {
                    for &subsample in &self.subsample {
                        for &colsample_bytree in &self.colsample_bytree {
                            combinations.push(BoostingParams {
                                max_depth,
                                learning_rate,
                                n_estimators,
                                subsample,
                                colsample_bytree,
                            });
                        }
                    }
                }
            }
        }
        combinations
    }

    pub fn len(&self) -> usize {
        self.max_depth.len()
            * self.learning_rate.len()
            * self.n_estimators.len()
            * self.subsample.len()
            * self.colsample_bytree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cross-validated score of one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub params: BoostingParams,
    pub fold_log_losses: Vec<f64>,
    pub mean_log_loss: f64,
}

/// Score every combination on every fold.
///
/// Results come back in the order of `combinations`.
pub fn grid_search(
    x: &[Vec<f64>],
    y: &[u8],
    folds: &[Fold],
    combinations: &[BoostingParams],
    seed: u64,
) -> Result<Vec<GridSearchResult>, TrainingError> {
    if combinations.is_empty() {
        return Err(TrainingError::InvalidConfig {
            reason: "hyperparameter grid is empty".to_string(),
        });
    }
    for params in combinations {
        params.validate()?;
    }

    let tasks: Vec<(usize, usize)> = (0..combinations.len())
        .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
        .collect();
    info!(
        "Grid search: {} combinations x {} folds = {} fits",
        combinations.len(),
        folds.len(),
        tasks.len()
    );

    let losses: Vec<(usize, usize, f64)> = tasks
        .into_par_iter()
        .map(|(c, f)| {
            let loss = evaluate_fold(x, y, &folds[f], combinations[c], seed)?;
            debug!("combination {} fold {}: log_loss={:.5}", c, f, loss);
            Ok((c, f, loss))
        })
        .collect::<Result<Vec<_>, TrainingError>>()?;

    let mut per_combination = vec![vec![0.0; folds.len()]; combinations.len()];
    for (c, f, loss) in losses {
        per_combination[c][f] = loss;
    }

    Ok(combinations
        .iter()
        .zip(per_combination)
        .map(|(&params, fold_log_losses)| {
            let mean_log_loss = if fold_log_losses.is_empty() {
                f64::INFINITY
            } else {
                fold_log_losses.iter().sum::<f64>() / fold_log_losses.len() as f64
            };
            GridSearchResult {
                params,
                fold_log_losses,
                mean_log_loss,
            }
        })
        .collect())
}

/// Lowest mean log-loss; the first such combination wins ties.
pub fn select_best(results: &[GridSearchResult]) -> Option<&GridSearchResult> {
    results.iter().fold(None, |best, candidate| match best {
        Some(b) if b.mean_log_loss <= candidate.mean_log_loss => Some(b),
        _ => Some(candidate),
    })
}

/// Fit on the fold's training block and return test log-loss.
fn evaluate_fold(
    x: &[Vec<f64>],
    y: &[u8],
    fold: &Fold,
    params: BoostingParams,
    seed: u64,
) -> Result<f64, TrainingError> {
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
    Ok(log_loss(&probs, &y[fold.test.clone()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::cross_validation::TimeSeriesSplit;

    fn result(depth: u16, loss: f64) -> GridSearchResult {
        GridSearchResult {
            params: BoostingParams {
                max_depth: depth,
                ..BoostingParams::default()
            },
            fold_log_losses: vec![loss],
            mean_log_loss: loss,
        }
    }

    #[test]
    fn test_default_grid_size() {
        let grid = HyperparameterGrid::default();
        assert_eq!(grid.len(), 108);
        assert_eq!(grid.combinations().len(), 108);
        let first = grid.combinations()[0];
        assert_eq!(first.max_depth, 3);
        assert_eq!(first.learning_rate, 0.01);
        assert_eq!(first.colsample_bytree, 0.8);
    }

    #[test]
    fn test_quick_grid_file_is_small() {
        let grid = HyperparameterGrid::from_toml_str(include_str!("../../../grid.quick.toml"))
            .unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid.combinations().iter().all(|p| p.n_estimators <= 30));
    }

    #[test]
    fn test_grid_from_toml() {
        let grid = HyperparameterGrid::from_toml_str(
            r#"
            max_depth = [2]
            learning_rate = [0.1, 0.3]
            n_estimators = [5]
            subsample = [1.0]
            colsample_bytree = [1.0]
            "#,
        )
        .unwrap();
        assert_eq!(grid.len(), 2);
        assert!(HyperparameterGrid::from_toml_str("max_depth = [2]").is_err());
    }

    #[test]
    fn test_select_best_prefers_lowest_then_first() {
        let results = vec![result(3, 4.0), result(5, 3.5), result(7, 3.5)];
        assert_eq!(select_best(&results).unwrap().params.max_depth, 5);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_grid_search_scores_each_combination() {
        let x: Vec<Vec<f64>> = (0..24).map(|i| vec![(i % 2) as f64, (i % 3) as f64]).collect();
        let y: Vec<u8> = (0..24).map(|i| if i % 2 == 0 { 10 } else { 20 }).collect();
        let folds = TimeSeriesSplit::new(2).unwrap().split(x.len()).unwrap();
        let combos = vec![
            BoostingParams {
                max_depth: 2,
                learning_rate: 0.1,
                n_estimators: 3,
                subsample: 1.0,
                colsample_bytree: 1.0,
            },
            BoostingParams {
                max_depth: 2,
                learning_rate: 0.5,
                n_estimators: 3,
                subsample: 1.0,
                colsample_bytree: 1.0,
            },
        ];

        let results = grid_search(&x, &y, &folds, &combos, 1).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].params, combos[0]);
        assert!(results.iter().all(|r| r.fold_log_losses.len() == 2));
        // A larger step on a separable signal fits faster.
        assert!(results[1].mean_log_loss < results[0].mean_log_loss);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            grid_search(&[], &[], &[], &[], 0),
            Err(TrainingError::InvalidConfig { .. })
        ));
    }
}
