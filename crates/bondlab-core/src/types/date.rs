//! Calendar date for schedule and accrual calculations.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BondlabError, BondlabResult};

/// A calendar date.
///
/// Newtype over `chrono::NaiveDate`; serializes as an ISO-8601 string.
///
/// # Example
///
/// ```rust
/// use bondlab_core::types::Date;
///
/// let maturity = Date::from_ymd(2030, 8, 31).unwrap();
/// let coupon = maturity.add_months(-6).unwrap();
/// assert_eq!(coupon, Date::from_ymd(2030, 2, 28).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from year, month and day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> BondlabResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| {
                BondlabError::invalid_instrument(format!(
                    "invalid date {year}-{month:02}-{day:02}"
                ))
            })
    }

    /// Parses an ISO 8601 date (`YYYY-MM-DD`).
    pub fn parse(s: &str) -> BondlabResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| BondlabError::invalid_instrument(format!("cannot parse date: {s}")))
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Checks if the date falls in a leap year.
    pub fn is_leap_year(&self) -> bool {
        self.0.leap_year()
    }

    /// Number of days in the date's month.
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Number of days in the date's year.
    pub fn days_in_year(&self) -> u32 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Checks if the date is the last day of its month.
    pub fn is_end_of_month(&self) -> bool {
        self.day() == self.days_in_month()
    }

    /// Adds (or subtracts) calendar days.
    pub fn add_days(&self, days: i64) -> BondlabResult<Self> {
        self.0
            .checked_add_signed(chrono::Duration::days(days))
            .map(Date)
            .ok_or_else(|| BondlabError::invalid_instrument("date out of range"))
    }

    /// Adds (or subtracts) months, clamping the day to the target month's end.
    pub fn add_months(&self, months: i32) -> BondlabResult<Self> {
        let total = self.year() * 12 + self.month() as i32 - 1 + months;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u32;
        let day = self.day().min(days_in_month(year, month));

        Self::from_ymd(year, month, day)
    }

    /// Adds (or subtracts) years, clamping 29 February.
    pub fn add_years(&self, years: i32) -> BondlabResult<Self> {
        self.add_months(years * 12)
    }

    /// Signed calendar days from `self` to `other`.
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl std::str::FromStr for Date {
    type Err = BondlabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
