//! The fixed 100-class label domain.

/// Number of possible doubles, 00-99.
pub const LABEL_COUNT: usize = 100;

/// Zero-padded label key used in probability outputs.
pub fn label_key(label: usize) -> String {
    format!("{:02}", label)
}

pub fn all_labels() -> impl Iterator<Item = usize> {
    0..LABEL_COUNT
}

/// Labels sorted by descending probability. Ties keep ascending label order.
pub fn ranked_labels(probabilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order
}
