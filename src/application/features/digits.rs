//! Digit-level statistics over draw sequences
//!
//! This module provides:
//! - Digit root (iterative digit-sum reduction)
//! - Trailing moving averages over a draw-count window
//! - Raw digit histograms
//! - Run lengths ending at the most recent value

/// Reduce `n` to a single digit by repeated digit summing.
///
/// `0` maps to `0`; every other value maps into `1..=9`.
pub fn digit_root(n: u32) -> u32 {
    if n == 0 { 0 } else { 1 + (n - 1) % 9 }
}

/// Mean of the last `window` values of `series`.
///
/// Short series are averaged over what is available; an empty series yields 0.0.
pub fn trailing_mean(series: &[f64], window: usize) -> f64 {
    let tail = trailing(series, window);
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Counts of each digit 0-9 among the last `window` values.
pub fn digit_histogram(digits: &[u8], window: usize) -> [u32; 10] {
    let mut counts = [0u32; 10];
    for &d in trailing(digits, window) {
        counts[usize::from(d.min(9))] += 1;
    }
    counts
}

/// Length of the run of values equal to the last element, counted backward.
pub fn trailing_run<T: PartialEq>(series: &[T]) -> usize {
    match series.last() {
        Some(last) => series.iter().rev().take_while(|v| *v == last).count(),
        None => 0,
    }
}

pub fn trailing<T>(series: &[T], window: usize) -> &[T] {
    &series[series.len().saturating_sub(window)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_root_known_values() {
        assert_eq!(digit_root(0), 0);
        assert_eq!(digit_root(9), 9);
        assert_eq!(digit_root(10), 1);
        assert_eq!(digit_root(27), 9);
        assert_eq!(digit_root(389), 2);
    }

    #[test]
    fn test_digit_root_range_and_idempotence() {
        for n in 0..5000u32 {
            let root = digit_root(n);
            assert!(root <= 9);
            assert_eq!(digit_root(root), root);
        }
        assert_eq!(digit_root(u32::MAX), digit_root(digit_root(u32::MAX)));
    }

    #[test]
    fn test_trailing_mean_short_history_uses_available_points() {
        let series = [3.0, 6.0, 9.0];
        assert_eq!(trailing_mean(&series, 7), 6.0);
        assert_eq!(trailing_mean(&series, 2), 7.5);
        assert_eq!(trailing_mean(&[], 7), 0.0);
    }

    #[test]
    fn test_digit_histogram_window() {
        let digits = [1, 1, 2, 3, 3, 3];
        let hist = digit_histogram(&digits, 4);
        assert_eq!(hist[2], 1);
        assert_eq!(hist[3], 3);
        assert_eq!(hist[1], 0);
        assert_eq!(hist.iter().sum::<u32>(), 4);
    }

    #[test]
    fn test_trailing_run() {
        assert_eq!(trailing_run::<u8>(&[]), 0);
        assert_eq!(trailing_run(&[4]), 1);
        assert_eq!(trailing_run(&[1, 4, 4, 4]), 3);
        assert_eq!(trailing_run(&[4, 4, 1]), 1);
    }
}
