//! Rate units.
//!
//! [`Percentage`] and [`BasisPoints`] are distinct types so a spread quoted
//! in basis points can never be added to a rate quoted in percent by
//! accident. Conversion is explicit: `percentage = basis_points / 100`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_finite, BondlabResult};

/// A rate in percent: `Percentage(5.0)` is 5 %.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

/// A rate in basis points: `BasisPoints(25.0)` is 0.25 %.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(f64);

impl Percentage {
    /// Creates a percentage; rejects non-finite values.
    pub fn new(value: f64) -> BondlabResult<Self> {
        ensure_finite("percentage", value).map(Self)
    }

    /// Creates a percentage from a decimal rate (0.05 → 5 %).
    pub fn from_decimal(rate: f64) -> BondlabResult<Self> {
        Self::new(rate * 100.0)
    }

    /// Converts basis points to percent.
    pub fn from_bps(bps: BasisPoints) -> Self {
        Self(bps.0 / 100.0)
    }

    /// The value in percent.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The value as a decimal rate (5 % → 0.05).
    pub fn as_decimal(self) -> f64 {
        self.0 / 100.0
    }
}

impl BasisPoints {
    /// Creates a basis-point quantity; rejects non-finite values.
    pub fn new(value: f64) -> BondlabResult<Self> {
        ensure_finite("basis points", value).map(Self)
    }

    /// Creates basis points from a decimal rate (0.0025 → 25 bps).
    pub fn from_decimal(rate: f64) -> BondlabResult<Self> {
        Self::new(rate * 10_000.0)
    }

    /// Converts percent to basis points.
    pub fn from_percentage(pct: Percentage) -> Self {
        Self(pct.0 * 100.0)
    }

    /// The value in basis points.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The value as a decimal rate (25 bps → 0.0025).
    pub fn as_decimal(self) -> f64 {
        self.0 / 10_000.0
    }
}

impl From<BasisPoints> for Percentage {
    fn from(bps: BasisPoints) -> Self {
        Percentage::from_bps(bps)
    }
}

impl From<Percentage> for BasisPoints {
    fn from(pct: Percentage) -> Self {
        BasisPoints::from_percentage(pct)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}%", self.0)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}bp", self.0)
    }
}
