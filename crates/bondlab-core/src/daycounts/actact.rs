//! Actual/Actual ISDA.

use chrono::Datelike;
use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// Actual/Actual ISDA.
///
/// The period is split at calendar-year boundaries; days falling in a leap
/// year count over 366, the rest over 365.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActActIsda;

impl ActActIsda {
    fn forward_fraction(start: Date, end: Date) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut year = start.year();
        let mut current = start.as_naive_date();
        let end = end.as_naive_date();

        while year < end.year() {
            let Some(next_year) = chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1) else {
                break;
            };
            let days = (next_year - current).num_days();
            total += Decimal::from(days) / Decimal::from(days_in_year(year));
            current = next_year;
            year += 1;
        }

        let days = (end - current).num_days();
        total + Decimal::from(days) / Decimal::from(days_in_year(year))
    }
}

fn days_in_year(year: i32) -> u32 {
    if chrono::NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "ACT/ACT ISDA"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        if end >= start {
            Self::forward_fraction(start, end)
        } else {
            -Self::forward_fraction(end, start)
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}
