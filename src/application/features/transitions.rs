//! Empirical digit-to-digit transition matrix.

/// Row-normalized 10x10 transition probabilities between consecutive digits.
/// Rows for digits never observed as a predecessor stay all-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    probs: [[f64; 10]; 10],
}

impl TransitionMatrix {
    /// Build from a digit sequence in chronological order.
    pub fn from_sequence(digits: &[u8]) -> Self {
        let mut counts = [[0u32; 10]; 10];
        for pair in digits.windows(2) {
            counts[usize::from(pair[0].min(9))][usize::from(pair[1].min(9))] += 1;
        }

        let mut probs = [[0.0; 10]; 10];
        for (row, row_counts) in probs.iter_mut().zip(counts.iter()) {
            let total: u32 = row_counts.iter().sum();
            if total == 0 {
                continue;
            }
            for (p, &c) in row.iter_mut().zip(row_counts.iter()) {
                *p = f64::from(c) / f64::from(total);
            }
        }
        Self { probs }
    }

    pub fn probability(&self, from: u8, to: u8) -> f64 {
        self.probs[usize::from(from.min(9))][usize::from(to.min(9))]
    }

    /// Base-2 Shannon entropy of the next-digit distribution given `from`.
    pub fn row_entropy(&self, from: u8) -> f64 {
        shannon_entropy(&self.probs[usize::from(from.min(9))])
    }
}

/// Base-2 Shannon entropy; zero-probability entries contribute nothing.
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .fold(0.0, |acc, &p| acc - p * p.log2())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_normalized() {
        let m = TransitionMatrix::from_sequence(&[1, 2, 1, 3, 1, 2]);
        let row_sum: f64 = (0..10).map(|to| m.probability(1, to)).sum();
        assert!((row_sum - 1.0).abs() < 1e-12);
        assert!((m.probability(1, 2) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.probability(5, 5), 0.0);
    }

    #[test]
    fn test_entropy() {
        // 1 -> 2 and 1 -> 3 once each: one bit of uncertainty.
        let m = TransitionMatrix::from_sequence(&[1, 2, 7, 1, 3]);
        assert!((m.row_entropy(1) - 1.0).abs() < 1e-12);
        // Deterministic row.
        assert_eq!(m.row_entropy(2), 0.0);
        // Unobserved row.
        assert_eq!(m.row_entropy(9), 0.0);
    }

    #[test]
    fn test_empty_sequence() {
        let m = TransitionMatrix::from_sequence(&[]);
        assert_eq!(m.row_entropy(0), 0.0);
        assert_eq!(m.probability(0, 0), 0.0);
    }
}
