//! Coupon payment frequency.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BondlabError, BondlabResult};

/// Coupon payments per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// One payment per year.
    Annual,
    /// Two payments per year.
    #[default]
    SemiAnnual,
    /// Four payments per year.
    Quarterly,
    /// Twelve payments per year.
    Monthly,
}

impl Frequency {
    /// Returns the number of periods per year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Returns the number of months per period.
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Builds a frequency from a payments-per-year count.
    pub fn from_periods_per_year(periods: u32) -> BondlabResult<Self> {
        match periods {
            1 => Ok(Frequency::Annual),
            2 => Ok(Frequency::SemiAnnual),
            4 => Ok(Frequency::Quarterly),
            12 => Ok(Frequency::Monthly),
            other => Err(BondlabError::invalid_instrument(format!(
                "unsupported coupon frequency: {other} per year"
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{name}")
    }
}
