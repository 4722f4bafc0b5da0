//! Day count conventions.
//!
//! A day count convention turns a pair of dates into a year fraction for
//! accrual and discounting.
//!
//! - [`Thirty360`]: 30/360 US bond basis
//! - [`Act360`]: actual days / 360
//! - [`Act365`]: actual days / 365
//! - [`ActActIsda`]: actual days split by calendar year, each part over
//!   that year's length
//!
//! The [`DayCount`] implementations return raw signed `Decimal` fractions.
//! Callers that need a validated `f64` go through [`year_fraction`], which
//! rejects reversed date pairs.
//!
//! ```rust
//! use bondlab_core::daycounts::{DayCount, Thirty360};
//! use bondlab_core::types::Date;
//!
//! let start = Date::from_ymd(2025, 1, 31).unwrap();
//! let end = Date::from_ymd(2025, 7, 31).unwrap();
//! assert_eq!(Thirty360.day_count(start, end), 180);
//! ```

mod act360;
mod act365;
mod actact;
mod thirty360;

pub use act360::Act360;
pub use act365::Act365;
pub use actact::ActActIsda;
pub use thirty360::Thirty360;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BondlabError, BondlabResult};
use crate::types::Date;

/// One 30/360 day, the floor for distinct dates.
const ONE_DAY_30_360: f64 = 1.0 / 360.0;

/// A day count convention.
pub trait DayCount: Send + Sync {
    /// Market name of the convention.
    fn name(&self) -> &'static str;

    /// Year fraction from `start` to `end` (negative if reversed).
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Day count from `start` to `end` under the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;
}

/// Runtime selector for the supported conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// 30/360 US bond basis.
    #[default]
    Thirty360,
    /// Actual/360.
    Act360,
    /// Actual/365 fixed.
    Act365,
    /// Actual/Actual ISDA.
    ActActIsda,
}

impl DayCountConvention {
    /// Creates a boxed day count implementation.
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Thirty360 => Box::new(Thirty360),
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Act365 => Box::new(Act365),
            DayCountConvention::ActActIsda => Box::new(ActActIsda),
        }
    }

    /// Market name of the convention.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Thirty360 => Thirty360.name(),
            DayCountConvention::Act360 => Act360.name(),
            DayCountConvention::Act365 => Act365.name(),
            DayCountConvention::ActActIsda => ActActIsda.name(),
        }
    }

    /// All supported conventions.
    pub fn all() -> &'static [DayCountConvention] {
        &[
            DayCountConvention::Thirty360,
            DayCountConvention::Act360,
            DayCountConvention::Act365,
            DayCountConvention::ActActIsda,
        ]
    }

    /// Raw year fraction without validation.
    pub fn raw_year_fraction(&self, start: Date, end: Date) -> Decimal {
        match self {
            DayCountConvention::Thirty360 => Thirty360.year_fraction(start, end),
            DayCountConvention::Act360 => Act360.year_fraction(start, end),
            DayCountConvention::Act365 => Act365.year_fraction(start, end),
            DayCountConvention::ActActIsda => ActActIsda.year_fraction(start, end),
        }
    }

    /// Validated year fraction; see [`year_fraction`].
    pub fn year_fraction(&self, start: Date, end: Date) -> BondlabResult<f64> {
        year_fraction(start, end, *self)
    }
}

/// Year fraction between two dates under `convention`.
///
/// Fails with `InvalidInstrument` when `end < start`. The result is
/// non-negative and strictly positive whenever `end > start`: 30/360 maps
/// the 30th and the 31st to the same day, so a zero count between distinct
/// dates is floored to one day.
pub fn year_fraction(
    start: Date,
    end: Date,
    convention: DayCountConvention,
) -> BondlabResult<f64> {
    if end < start {
        return Err(BondlabError::invalid_instrument(format!(
            "end date {end} precedes start date {start}"
        )));
    }

    let yf = convention
        .raw_year_fraction(start, end)
        .to_f64()
        .ok_or_else(|| BondlabError::calculation("year fraction out of f64 range"))?;
    if end > start && yf <= 0.0 {
        return Ok(ONE_DAY_30_360);
    }
    Ok(yf.max(0.0))
}

impl std::fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DayCountConvention {
    type Err = BondlabError;

    /// Accepts market names ("30/360", "ACT/360") and enum-style names
    /// ("Thirty360", "ActActIsda"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "30/360" | "30/360US" | "THIRTY360" | "BONDBASIS" => Ok(DayCountConvention::Thirty360),
            "ACT/360" | "ACTUAL/360" | "ACT360" => Ok(DayCountConvention::Act360),
            "ACT/365" | "ACT/365F" | "ACTUAL/365" | "ACT365" | "ACT365FIXED" => {
                Ok(DayCountConvention::Act365)
            }
            "ACT/ACT" | "ACT/ACTISDA" | "ACTUAL/ACTUAL" | "ACTACT" | "ACTACTISDA" => {
                Ok(DayCountConvention::ActActIsda)
            }
            _ => Err(BondlabError::invalid_instrument(format!(
                "unknown day count convention: {s}"
            ))),
        }
    }
}
