//! Feature Engine
//!
//! Maps a chronological draw history and a target date to a [`FeatureVector`].
//! Only draws strictly before the target date are ever read; the draw being
//! predicted never contributes to its own features.
//!
//! Slots that describe "the current pairing" (sums, digit roots, digit
//! decompositions, pair comparisons, streaks) are taken from the anchor, the
//! most recent prior draw. With an empty history they stay at 0.0.

use super::calendar;
use super::digits::{digit_histogram, digit_root, trailing, trailing_mean, trailing_run};
use super::transitions::TransitionMatrix;
use crate::domain::draw::DrawRecord;
use crate::domain::ml::feature_registry::{FeatureId, FeatureVector};
use chrono::NaiveDate;

/// Draw-count windows for the moving averages.
pub const MOVING_AVERAGE_WINDOWS: [usize; 3] = [7, 14, 30];

/// Draw-count window for the digit histograms.
pub const FREQUENCY_WINDOW: usize = 30;

/// Draw-count window that `recency_index` is measured against.
pub const RECENCY_WINDOW: usize = 30;

const MA_SLOTS: [(FeatureId, FeatureId, FeatureId, FeatureId); 3] = [
    (
        FeatureId::OpenSumMa7,
        FeatureId::CloseSumMa7,
        FeatureId::DoubleTensMa7,
        FeatureId::DoubleUnitsMa7,
    ),
    (
        FeatureId::OpenSumMa14,
        FeatureId::CloseSumMa14,
        FeatureId::DoubleTensMa14,
        FeatureId::DoubleUnitsMa14,
    ),
    (
        FeatureId::OpenSumMa30,
        FeatureId::CloseSumMa30,
        FeatureId::DoubleTensMa30,
        FeatureId::DoubleUnitsMa30,
    ),
];

/// Compute the feature vector for `target` from an ascending `history`.
///
/// Records dated on or after `target` are ignored, so callers may pass the
/// full history. Deterministic and defined for any history length.
pub fn compute(history: &[DrawRecord], target: NaiveDate) -> FeatureVector {
    let cut = history.partition_point(|r| r.date < target);
    let prior = &history[..cut];

    let mut fv = FeatureVector::default();
    set_calendar(&mut fv, prior, target);
    set_moving_averages(&mut fv, prior);
    set_frequencies(&mut fv, prior);
    set_transitions(&mut fv, prior);
    if let Some(anchor) = prior.last() {
        set_anchor(&mut fv, anchor);
        set_streaks(&mut fv, prior);
    }
    fv
}

fn set_calendar(fv: &mut FeatureVector, prior: &[DrawRecord], target: NaiveDate) {
    fv.set(FeatureId::DayOfWeek, f64::from(calendar::day_of_week(target)));
    fv.set(FeatureId::IsWeekend, flag(calendar::is_weekend(target)));
    fv.set(FeatureId::WeekOfMonth, f64::from(calendar::week_of_month(target)));

    let (month_sin, month_cos) = calendar::month_cycle(target);
    fv.set(FeatureId::MonthSin, month_sin);
    fv.set(FeatureId::MonthCos, month_cos);
    let (day_sin, day_cos) = calendar::day_cycle(target);
    fv.set(FeatureId::DaySin, day_sin);
    fv.set(FeatureId::DayCos, day_cos);

    if let Some(oldest) = trailing(prior, RECENCY_WINDOW).first() {
        fv.set(
            FeatureId::RecencyIndex,
            (target - oldest.date).num_days() as f64,
        );
    }
}

fn set_moving_averages(fv: &mut FeatureVector, prior: &[DrawRecord]) {
    let open_sums: Vec<f64> = prior.iter().map(|r| f64::from(r.open3.digit_sum())).collect();
    let close_sums: Vec<f64> = prior.iter().map(|r| f64::from(r.close3.digit_sum())).collect();
    let tens: Vec<f64> = prior.iter().map(|r| f64::from(r.tens())).collect();
    let units: Vec<f64> = prior.iter().map(|r| f64::from(r.units())).collect();

    for (window, (open_id, close_id, tens_id, units_id)) in
        MOVING_AVERAGE_WINDOWS.into_iter().zip(MA_SLOTS)
    {
        fv.set(open_id, trailing_mean(&open_sums, window));
        fv.set(close_id, trailing_mean(&close_sums, window));
        fv.set(tens_id, trailing_mean(&tens, window));
        fv.set(units_id, trailing_mean(&units, window));
    }
}

fn set_frequencies(fv: &mut FeatureVector, prior: &[DrawRecord]) {
    let tens: Vec<u8> = prior.iter().map(DrawRecord::tens).collect();
    let units: Vec<u8> = prior.iter().map(DrawRecord::units).collect();
    let tens_hist = digit_histogram(&tens, FREQUENCY_WINDOW);
    let units_hist = digit_histogram(&units, FREQUENCY_WINDOW);

    for digit in 0..10u8 {
        fv.set(
            FeatureId::tens_freq(digit),
            f64::from(tens_hist[usize::from(digit)]),
        );
        fv.set(
            FeatureId::units_freq(digit),
            f64::from(units_hist[usize::from(digit)]),
        );
    }
}

fn set_transitions(fv: &mut FeatureVector, prior: &[DrawRecord]) {
    let Some(anchor) = prior.last() else {
        return;
    };
    let tens: Vec<u8> = prior.iter().map(DrawRecord::tens).collect();
    let units: Vec<u8> = prior.iter().map(DrawRecord::units).collect();
    let tens_matrix = TransitionMatrix::from_sequence(&tens);
    let units_matrix = TransitionMatrix::from_sequence(&units);

    if prior.len() >= 2 {
        let prev = &prior[prior.len() - 2];
        let into_current = (tens_matrix.probability(prev.tens(), anchor.tens())
            + units_matrix.probability(prev.units(), anchor.units()))
            / 2.0;
        fv.set(FeatureId::AvgTransitionToCurrent, into_current);
    }

    let entropy =
        (tens_matrix.row_entropy(anchor.tens()) + units_matrix.row_entropy(anchor.units())) / 2.0;
    fv.set(FeatureId::TransitionEntropy, entropy);
}

fn set_anchor(fv: &mut FeatureVector, anchor: &DrawRecord) {
    let open_sum = anchor.open3.digit_sum();
    let close_sum = anchor.close3.digit_sum();

    fv.set(FeatureId::OpenSum, f64::from(open_sum));
    fv.set(FeatureId::CloseSum, f64::from(close_sum));
    fv.set(FeatureId::DigitRootOpen, f64::from(digit_root(open_sum)));
    fv.set(FeatureId::DigitRootClose, f64::from(digit_root(close_sum)));
    fv.set(FeatureId::OpenTens, f64::from(anchor.open3.tens()));
    fv.set(FeatureId::OpenUnits, f64::from(anchor.open3.units()));
    fv.set(FeatureId::CloseTens, f64::from(anchor.close3.tens()));
    fv.set(FeatureId::CloseUnits, f64::from(anchor.close3.units()));
    fv.set(FeatureId::DoubleTens, f64::from(anchor.tens()));
    fv.set(FeatureId::DoubleUnits, f64::from(anchor.units()));
    fv.set(FeatureId::SumProduct, f64::from(open_sum * close_sum));
    fv.set(
        FeatureId::DoubleSum,
        f64::from(anchor.tens() + anchor.units()),
    );

    let (open, close) = (anchor.open3, anchor.close3);
    fv.set(
        FeatureId::IsSwap,
        flag(open.tens() == close.units() && open.units() == close.tens()),
    );
    fv.set(
        FeatureId::TensDiff,
        f64::from(open.tens()) - f64::from(close.tens()),
    );
    fv.set(
        FeatureId::UnitsDiff,
        f64::from(open.units()) - f64::from(close.units()),
    );
    fv.set(
        FeatureId::SumDiff,
        f64::from(open_sum) - f64::from(close_sum),
    );
}

fn set_streaks(fv: &mut FeatureVector, prior: &[DrawRecord]) {
    let doubles: Vec<u8> = prior.iter().map(|r| r.double.value()).collect();
    let tens: Vec<u8> = prior.iter().map(DrawRecord::tens).collect();
    let units: Vec<u8> = prior.iter().map(DrawRecord::units).collect();

    fv.set(FeatureId::DoubleStreak, trailing_run(&doubles) as f64);
    fv.set(FeatureId::TensStreak, trailing_run(&tens) as f64);
    fv.set(FeatureId::UnitsStreak, trailing_run(&units) as f64);
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
