//! Multi-class evaluation metrics over the 100-label space.

use crate::domain::ml::label_space::ranked_labels;
use serde::{Deserialize, Serialize};

/// Probabilities are clipped to `[EPS, 1]` before taking logs.
pub const LOG_LOSS_EPS: f64 = 1e-15;

/// Mean negative log-likelihood of the true labels.
///
/// Each row of `probs` is a distribution over every label, so labels absent
/// from `labels` still contribute a defined probability.
pub fn log_loss(probs: &[Vec<f64>], labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = probs
        .iter()
        .zip(labels)
        .map(|(row, &label)| {
            let p = row
                .get(usize::from(label))
                .copied()
                .unwrap_or(0.0)
                .clamp(LOG_LOSS_EPS, 1.0);
            -p.ln()
        })
        .sum();
    total / labels.len() as f64
}

/// Fraction of rows whose true label is among the `k` most probable labels.
/// Ties are ordered by ascending label.
pub fn top_k_accuracy(probs: &[Vec<f64>], labels: &[u8], k: usize) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let hits = probs
        .iter()
        .zip(labels)
        .filter(|(row, label)| {
            ranked_labels(row)
                .iter()
                .take(k)
                .any(|&l| l == usize::from(**label))
        })
        .count();
    hits as f64 / labels.len() as f64
}

/// Fraction of rows whose most probable label is the true label.
pub fn accuracy(probs: &[Vec<f64>], labels: &[u8]) -> f64 {
    top_k_accuracy(probs, labels, 1)
}

/// Evaluation of one cross-validation fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub log_loss: f64,
    pub top1_acc: f64,
    pub top3_acc: f64,
    pub top5_acc: f64,
}

impl FoldMetrics {
    pub fn evaluate(fold: usize, train_size: usize, probs: &[Vec<f64>], labels: &[u8]) -> Self {
        Self {
            fold,
            train_size,
            test_size: labels.len(),
            accuracy: accuracy(probs, labels),
            log_loss: log_loss(probs, labels),
            top1_acc: top_k_accuracy(probs, labels, 1),
            top3_acc: top_k_accuracy(probs, labels, 3),
            top5_acc: top_k_accuracy(probs, labels, 5),
        }
    }
}

/// Fold metrics averaged across folds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub avg_accuracy: f64,
    pub avg_top1_acc: f64,
    pub avg_top3_acc: f64,
    pub avg_top5_acc: f64,
    pub avg_log_loss: f64,
}

impl MetricsSummary {
    pub fn from_folds(folds: &[FoldMetrics]) -> Self {
        if folds.is_empty() {
            return Self::default();
        }
        let n = folds.len() as f64;
        let mean = |f: fn(&FoldMetrics) -> f64| folds.iter().map(f).sum::<f64>() / n;
        Self {
            avg_accuracy: mean(|m| m.accuracy),
            avg_top1_acc: mean(|m| m.top1_acc),
            avg_top3_acc: mean(|m| m.top3_acc),
            avg_top5_acc: mean(|m| m.top5_acc),
            avg_log_loss: mean(|m| m.log_loss),
        }
    }
}
