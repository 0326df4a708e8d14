//! Chronological cross-validation.
//!
//! Expanding-window splits: every fold trains on a prefix of the time-ordered
//! dataset and tests on the block that immediately follows it. Rows are never
//! shuffled.

use crate::domain::errors::TrainingError;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub train: Range<usize>,
    pub test: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSplit {
    n_splits: usize,
}

impl TimeSeriesSplit {
    pub fn new(n_splits: usize) -> Result<Self, TrainingError> {
        if n_splits < 2 {
            return Err(TrainingError::InvalidConfig {
                reason: format!("at least 2 folds are required, got {}", n_splits),
            });
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Smallest dataset that yields at least two rows per test block.
    pub fn min_samples(&self) -> usize {
        2 * (self.n_splits + 1)
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, TrainingError> {
        let test_size = n_samples / (self.n_splits + 1);
        if test_size == 0 {
            return Err(TrainingError::InsufficientData {
                available: n_samples,
                required: self.min_samples(),
            });
        }
        let first_test = n_samples - self.n_splits * test_size;
        Ok((0..self.n_splits)
            .map(|index| {
                let start = first_test + index * test_size;
                Fold {
                    index,
                    train: 0..start,
                    test: start..start + test_size,
                }
            })
            .collect())
    }
}
