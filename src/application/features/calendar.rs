//! Calendar and cyclic seasonality encodings of a target date.

use chrono::{Datelike, NaiveDate, Weekday};
use std::f64::consts::PI;

/// 0 = Sunday ... 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 1-based week row of `date` in a Sunday-first month calendar.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(day_of_week)
        .unwrap_or_default();
    (date.day() - 1 + first_weekday) / 7 + 1
}

/// (sin, cos) of `value` on a circle of `period`.
pub fn cyclic(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

/// Month-of-year position, January at angle zero.
pub fn month_cycle(date: NaiveDate) -> (f64, f64) {
    cyclic(f64::from(date.month0()), 12.0)
}

pub fn day_cycle(date: NaiveDate) -> (f64, f64) {
    cyclic(f64::from(date.day()), 31.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_of_week_and_weekend() {
        // 2024-01-05 is a Friday, 2024-01-06 a Saturday, 2024-01-07 a Sunday.
        assert_eq!(day_of_week(date(2024, 1, 5)), 5);
        assert!(!is_weekend(date(2024, 1, 5)));
        assert!(is_weekend(date(2024, 1, 6)));
        assert!(is_weekend(date(2024, 1, 7)));
        assert_eq!(day_of_week(date(2024, 1, 7)), 0);
    }

    #[test]
    fn test_week_of_month() {
        // January 2024 starts on a Monday.
        assert_eq!(week_of_month(date(2024, 1, 1)), 1);
        assert_eq!(week_of_month(date(2024, 1, 6)), 1);
        assert_eq!(week_of_month(date(2024, 1, 7)), 2);
        assert_eq!(week_of_month(date(2024, 1, 31)), 5);
    }

    #[test]
    fn test_cycles_have_no_wraparound_jump() {
        let (dec_sin, dec_cos) = month_cycle(date(2023, 12, 1));
        let (jan_sin, jan_cos) = month_cycle(date(2024, 1, 1));
        let (feb_sin, feb_cos) = month_cycle(date(2024, 2, 1));
        let d1 = ((dec_sin - jan_sin).powi(2) + (dec_cos - jan_cos).powi(2)).sqrt();
        let d2 = ((jan_sin - feb_sin).powi(2) + (jan_cos - feb_cos).powi(2)).sqrt();
        assert!((d1 - d2).abs() < 1e-12);
        assert_eq!((jan_sin, jan_cos), (0.0, 1.0));
    }
}
