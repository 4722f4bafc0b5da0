//! 30/360 US (bond basis).

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

#[inline]
fn is_last_day_of_february(date: Date) -> bool {
    date.month() == 2 && date.is_end_of_month()
}

/// 30/360 US bond basis.
///
/// Every month counts 30 days and the year 360:
///
/// 1. If D1 is the last day of February, D1 = 30
/// 2. If D1 is 31, D1 = 30
/// 3. If D2 is the last day of February and D1 was too, D2 = 30
/// 4. If D2 is 31 and D1 is now 30 or more, D2 = 30
///
/// `days = 360·(Y2 - Y1) + 30·(M2 - M1) + (D2 - D1)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thirty360;

impl DayCount for Thirty360 {
    fn name(&self) -> &'static str {
        "30/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(self.day_count(start, end)) / Decimal::from(360)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        let (y1, y2) = (i64::from(start.year()), i64::from(end.year()));
        let (m1, m2) = (i64::from(start.month()), i64::from(end.month()));
        let mut d1 = i64::from(start.day());
        let mut d2 = i64::from(end.day());

        let start_feb_eom = is_last_day_of_february(start);
        if start_feb_eom || d1 == 31 {
            d1 = 30;
        }

        if is_last_day_of_february(end) && start_feb_eom {
            d2 = 30;
        } else if d2 == 31 && d1 >= 30 {
            d2 = 30;
        }

        360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_regular_periods() {
        assert_eq!(Thirty360.day_count(d(2025, 1, 15), d(2025, 7, 15)), 180);
        assert_eq!(Thirty360.year_fraction(d(2025, 1, 15), d(2030, 1, 15)), dec!(5));
    }

    #[test]
    fn test_month_end_rules() {
        assert_eq!(Thirty360.day_count(d(2025, 1, 31), d(2025, 3, 31)), 60);
        assert_eq!(Thirty360.day_count(d(2025, 1, 30), d(2025, 3, 31)), 60);
        assert_eq!(Thirty360.day_count(d(2025, 1, 29), d(2025, 3, 31)), 62);
    }

    #[test]
    fn test_february_end_of_month() {
        // Feb EOM to Aug 31: both ends pinned to 30
        assert_eq!(Thirty360.day_count(d(2024, 2, 29), d(2024, 8, 31)), 180);
        // Aug 31 to Feb EOM: D2 is not adjusted
        assert_eq!(Thirty360.day_count(d(2024, 8, 31), d(2025, 2, 28)), 178);
        assert_eq!(Thirty360.day_count(d(2024, 2, 29), d(2025, 2, 28)), 360);
    }
}
