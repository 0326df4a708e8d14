//! Softmax gradient-boosted classifier over the 100-label space.
//!
//! Every boosting round fits one smartcore regression tree per observed class
//! on the softmax residuals of a row sample, restricted to a column sample.
//! Labels never seen in training keep their smoothed prior logit, so the
//! output is always a full, strictly positive distribution over all 100 labels.

use crate::domain::errors::{ModelError, TrainingError};
use crate::domain::ml::label_space::LABEL_COUNT;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use std::collections::BTreeSet;
use std::fmt;

type RegressionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Additive smoothing applied to the class prior.
const PRIOR_ALPHA: f64 = 1.0;

/// Classifier hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub max_depth: u16,
    pub learning_rate: f64,
    pub n_estimators: usize,
    /// Fraction of rows sampled per round, in (0, 1].
    pub subsample: f64,
    /// Fraction of columns sampled per round, in (0, 1].
    pub colsample_bytree: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            learning_rate: 0.1,
            n_estimators: 100,
            subsample: 1.0,
            colsample_bytree: 1.0,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<(), TrainingError> {
        let invalid = |reason: String| Err(TrainingError::InvalidConfig { reason });
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".to_string());
        }
        if self.n_estimators == 0 {
            return invalid("n_estimators must be at least 1".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid(format!("subsample must be in (0, 1], got {}", self.subsample));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return invalid(format!(
                "colsample_bytree must be in (0, 1], got {}",
                self.colsample_bytree
            ));
        }
        Ok(())
    }
}

impl fmt::Display for BoostingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth={} lr={} trees={} subsample={} colsample={}",
            self.max_depth,
            self.learning_rate,
            self.n_estimators,
            self.subsample,
            self.colsample_bytree
        )
    }
}

#[derive(Serialize, Deserialize)]
struct BoostingRound {
    /// Feature columns this round's trees were fitted on.
    columns: Vec<usize>,
    /// One tree per entry of `classes`.
    trees: Vec<RegressionTree>,
}

#[derive(Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    params: BoostingParams,
    n_features: usize,
    /// Label decoder: class index -> label (0-99).
    classes: Vec<u8>,
    base_logits: Vec<f64>,
    rounds: Vec<BoostingRound>,
}

impl fmt::Debug for GradientBoostedClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoostedClassifier")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .field("classes", &self.classes.len())
            .field("rounds", &self.rounds.len())
            .finish()
    }
}

impl GradientBoostedClassifier {
    /// Fit on rows `x` with labels `y` (each 0-99).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        params: BoostingParams,
        seed: u64,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        if x.is_empty() {
            return Err(TrainingError::InsufficientData {
                available: 0,
                required: 1,
            });
        }
        if x.len() != y.len() {
            return Err(TrainingError::Classifier {
                reason: format!("{} rows but {} labels", x.len(), y.len()),
            });
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(TrainingError::Classifier {
                reason: "rows must share a non-zero width".to_string(),
            });
        }
        if let Some(&bad) = y.iter().find(|&&label| usize::from(label) >= LABEL_COUNT) {
            return Err(TrainingError::Classifier {
                reason: format!("label {} outside the label space", bad),
            });
        }

        let classes: Vec<u8> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let base_logits = prior_logits(y);

        let n = x.len();
        let mut logits: Vec<Vec<f64>> = vec![base_logits.clone(); n];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rounds = Vec::with_capacity(params.n_estimators);

        let tree_params =
            DecisionTreeRegressorParameters::default().with_max_depth(params.max_depth);

        for _ in 0..params.n_estimators {
            let probs: Vec<Vec<f64>> = logits.iter().map(|l| softmax(l)).collect();
            let rows = sample_indices(&mut rng, n, params.subsample);
            let columns = sample_indices(&mut rng, n_features, params.colsample_bytree);

            let sampled = project(x, &rows, &columns)?;
            let all_rows: Vec<usize> = (0..n).collect();
            let full = project(x, &all_rows, &columns)?;

            let mut trees = Vec::with_capacity(classes.len());
            for &label in &classes {
                let l = usize::from(label);
                let residuals: Vec<f64> = rows
                    .iter()
                    .map(|&i| indicator(y[i] == label) - probs[i][l])
                    .collect();
                let tree = RegressionTree::fit(&sampled, &residuals, tree_params.clone())
                    .map_err(|e| TrainingError::Classifier {
                        reason: format!("tree fit failed: {}", e),
                    })?;
                let update = tree.predict(&full).map_err(|e| TrainingError::Classifier {
                    reason: format!("tree predict failed: {}", e),
                })?;
                for (row_logits, step) in logits.iter_mut().zip(update) {
                    row_logits[l] += params.learning_rate * step;
                }
                trees.push(tree);
            }
            rounds.push(BoostingRound { columns, trees });
        }

        Ok(Self {
            params,
            n_features,
            classes,
            base_logits,
            rounds,
        })
    }

    /// Observed labels, in class-index order.
    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    /// Probability distribution over all 100 labels for each row.
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        if let Some(row) = x.iter().find(|row| row.len() != self.n_features) {
            return Err(ModelError::Prediction {
                reason: format!(
                    "expected {} features per row, got {}",
                    self.n_features,
                    row.len()
                ),
            });
        }
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let mut logits: Vec<Vec<f64>> = vec![self.base_logits.clone(); x.len()];
        let all_rows: Vec<usize> = (0..x.len()).collect();
        for round in &self.rounds {
            let matrix = project(x, &all_rows, &round.columns).map_err(|e| {
                ModelError::Prediction {
                    reason: e.to_string(),
                }
            })?;
            for (tree, &label) in round.trees.iter().zip(&self.classes) {
                let update = tree.predict(&matrix).map_err(|e| ModelError::Prediction {
                    reason: format!("tree predict failed: {}", e),
                })?;
                for (row_logits, step) in logits.iter_mut().zip(update) {
                    row_logits[usize::from(label)] += self.params.learning_rate * step;
                }
            }
        }
        Ok(logits.iter().map(|l| softmax(l)).collect())
    }

    pub fn predict_proba_one(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.predict_proba(&[x.to_vec()])?
            .pop()
            .ok_or_else(|| ModelError::Prediction {
                reason: "no prediction returned".to_string(),
            })
    }
}

/// Log of the Laplace-smoothed label frequencies over the full label space.
fn prior_logits(y: &[u8]) -> Vec<f64> {
    let mut counts = [0usize; LABEL_COUNT];
    for &label in y {
        counts[usize::from(label)] += 1;
    }
    let denom = y.len() as f64 + PRIOR_ALPHA * LABEL_COUNT as f64;
    counts
        .iter()
        .map(|&c| ((c as f64 + PRIOR_ALPHA) / denom).ln())
        .collect()
}

pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn indicator(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Sorted indices of a `fraction` sample of `0..n`, at least one.
fn sample_indices(rng: &mut StdRng, n: usize, fraction: f64) -> Vec<usize> {
    let amount = ((n as f64 * fraction).ceil() as usize).clamp(1, n.max(1));
    if amount >= n {
        return (0..n).collect();
    }
    let mut picked = index::sample(rng, n, amount).into_vec();
    picked.sort_unstable();
    picked
}

fn project(
    x: &[Vec<f64>],
    rows: &[usize],
    columns: &[usize],
) -> Result<DenseMatrix<f64>, TrainingError> {
    let data: Vec<Vec<f64>> = rows
        .iter()
        .map(|&r| columns.iter().map(|&c| x[r][c]).collect())
        .collect();
    DenseMatrix::from_2d_vec(&data).map_err(|e| TrainingError::Classifier {
        reason: format!("Matrix error: {}", e),
    })
}
