//! Indian financial-year arithmetic.
//!
//! The financial year runs April 1 through March 31 and is labeled
//! "YYYY-YY" after its starting calendar year, e.g. "2025-26".

use chrono::{Datelike, NaiveDate};

/// Financial-year label for the year containing `date`.
pub fn fy_period_for(date: NaiveDate) -> String {
    let start_year = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}

/// First and last day of the financial year labeled `fy_period`.
///
/// Returns `None` when the label does not parse as "YYYY-YY".
pub fn fy_bounds(fy_period: &str) -> Option<(NaiveDate, NaiveDate)> {
    let start_year: i32 = fy_period.split('-').next()?.parse().ok()?;
    let start = NaiveDate::from_ymd_opt(start_year, 4, 1)?;
    let end = NaiveDate::from_ymd_opt(start_year + 1, 3, 31)?;
    Some((start, end))
}

/// Fraction of the financial year containing `today` that has elapsed,
/// clamped to [0, 1].
pub fn fy_elapsed_fraction(today: NaiveDate) -> f64 {
    let start_year = if today.month() >= 4 {
        today.year()
    } else {
        today.year() - 1
    };
    // Both dates are fixed calendar days, so construction cannot fail.
    let Some(fy_start) = NaiveDate::from_ymd_opt(start_year, 4, 1) else {
        return 0.0;
    };
    let Some(fy_end) = NaiveDate::from_ymd_opt(start_year + 1, 3, 31) else {
        return 0.0;
    };

    let total_days = (fy_end - fy_start).num_days() as f64;
    let elapsed_days = (today - fy_start).num_days() as f64;
    (elapsed_days / total_days).clamp(0.0, 1.0)
}

/// Labels for a dropdown-style range of financial years around `today`:
/// five back, one forward.
pub fn fy_periods_around(today: NaiveDate) -> Vec<String> {
    let current = if today.month() >= 4 {
        today.year()
    } else {
        today.year() - 1
    };
    (current - 5..=current + 1)
        .map(|y| format!("{}-{:02}", y, (y + 1) % 100))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(2025, 4, 1, "2025-26"; "fy start day")]
    #[test_case(2025, 3, 31, "2024-25"; "fy end day")]
    #[test_case(2025, 12, 15, "2025-26"; "mid fy")]
    #[test_case(2026, 1, 10, "2025-26"; "january belongs to prior label")]
    #[test_case(1999, 6, 1, "1999-00"; "century rollover label")]
    fn labels(y: i32, m: u32, d: u32, expect: &str) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(fy_period_for(date), expect);
    }

    #[test]
    fn bounds_round_trip() {
        let (start, end) = fy_bounds("2025-26").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(fy_period_for(start), "2025-26");
        assert_eq!(fy_period_for(end), "2025-26");
    }

    #[test]
    fn bounds_reject_garbage() {
        assert!(fy_bounds("not-a-year").is_none());
        assert!(fy_bounds("").is_none());
    }

    #[test]
    fn elapsed_fraction_is_zero_on_fy_start() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(fy_elapsed_fraction(date), 0.0);
    }

    #[test]
    fn elapsed_fraction_is_one_on_fy_end() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert!((fy_elapsed_fraction(date) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_fraction_midway() {
        // Oct 1 is roughly half the year in.
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let frac = fy_elapsed_fraction(date);
        assert!(frac > 0.49 && frac < 0.52, "frac = {frac}");
    }

    #[test]
    fn periods_around_spans_seven_years() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let periods = fy_periods_around(date);
        assert_eq!(periods.len(), 7);
        assert_eq!(periods.first().map(String::as_str), Some("2020-21"));
        assert_eq!(periods.last().map(String::as_str), Some("2026-27"));
    }
}
