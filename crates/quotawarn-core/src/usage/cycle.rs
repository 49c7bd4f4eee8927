//! Billing-cycle position from calendar dates.

use chrono::{Datelike, NaiveDate};

/// Fraction of the billing cycle elapsed on `today` for a cycle ending on
/// `cycle_end` and lasting `days_in_cycle` days.
///
/// Providers usually report only the cycle end date, so the position is
/// derived from the days remaining. The result is clamped to [0, 1] so a
/// stale end date or a short month never yields an invalid snapshot.
pub fn billing_fraction(today: NaiveDate, cycle_end: NaiveDate, days_in_cycle: u32) -> f64 {
    if days_in_cycle == 0 {
        return 1.0;
    }
    let remaining = (cycle_end - today).num_days() as f64;
    (1.0 - remaining / f64::from(days_in_cycle)).clamp(0.0, 1.0)
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|n| n.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2024, 12, 31)), 31);
        assert_eq!(days_in_month(date(2024, 4, 1)), 30);
    }

    #[test]
    fn test_billing_fraction() {
        assert!((billing_fraction(date(2024, 4, 24), date(2024, 4, 30), 30) - 0.8).abs() < 1e-12);
        assert_eq!(billing_fraction(date(2024, 4, 30), date(2024, 4, 30), 30), 1.0);
    }

    #[test]
    fn test_billing_fraction_clamps() {
        // End date already passed
        assert_eq!(billing_fraction(date(2024, 5, 3), date(2024, 4, 30), 30), 1.0);
        // End date further away than a whole cycle
        assert_eq!(billing_fraction(date(2024, 4, 1), date(2024, 6, 1), 30), 0.0);
        assert_eq!(billing_fraction(date(2024, 4, 1), date(2024, 4, 2), 0), 1.0);
    }
}
