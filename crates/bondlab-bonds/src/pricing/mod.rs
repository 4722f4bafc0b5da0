//! Bond pricing.
//!
//! - [`price_from_yield`] / [`price`]: street-convention yield pricing
//! - [`yield_from_price`] and [`YieldSolver`]: Newton-Raphson inversion
//! - [`accrued`]: accrued interest under the bond's own and other conventions
//! - [`price_from_curve`]: discounting on a zero curve, optionally spread
//! - [`BondQuote`]: quoted bonds as bootstrap instruments
//!
//! Discounting at yield `y` uses `(1 + y/m)^(-t·m)`, with `m` the coupon
//! frequency (1 for zero coupons) and `t` from [`Timeline`]. The discounted
//! sum is the dirty price; the clean price is that less accrued interest.
//!
//! [`Timeline`]: crate::cashflows::Timeline

pub mod accrued;
mod curve;
mod quotes;
mod yield_solver;

pub use accrued::{
    accrued_interest, accrued_interest_act_360, accrued_interest_act_365,
    accrued_interest_act_act, accrued_interest_thirty_360, accrued_interest_under,
};
pub use curve::{price_from_curve, price_from_curve_with_spread};
pub use quotes::{bootstrap_from_bonds, BondQuote};
pub use yield_solver::{
    yield_from_price, yield_to_call, yield_to_exercise, yield_to_put, yield_to_worst,
    YieldResult, YieldSolver, YieldToWorst,
};

use serde::{Deserialize, Serialize};

use bondlab_core::error::ensure_finite;
use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};

use crate::bond::Bond;
use crate::cashflows::{discounting_flows_on, TimedCashFlow, Timeline};

/// Clean and dirty price with the accrued interest between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Quoted price: dirty less accrued.
    pub clean: f64,
    /// Full price: present value of the remaining flows.
    pub dirty: f64,
    /// Accrued interest.
    pub accrued: f64,
}

impl PriceResult {
    pub(crate) fn from_dirty(dirty: f64, accrued: f64) -> Self {
        Self {
            clean: dirty - accrued,
            dirty,
            accrued,
        }
    }
}

/// Clean, dirty and accrued at yield `y` (decimal).
///
/// Floating notes discount par plus the next coupon over the remaining
/// part of the current period, with `y` as the discount rate.
pub fn price(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<PriceResult> {
    ensure_finite("yield", y)?;
    let timeline = Timeline::new(bond, settlement)?;
    let flows = discounting_flows_on(bond, &timeline)?;
    let accrued = accrued::accrued_on(bond, &timeline)?;
    let dirty = present_value(&flows, y, bond.periods_per_year())?;
    Ok(PriceResult::from_dirty(dirty, accrued))
}

/// Clean price at yield `y`.
///
/// ```rust
/// use bondlab_bonds::bond::{Bond, FixedRateBond};
/// use bondlab_bonds::pricing::price_from_yield;
/// use bondlab_core::daycounts::DayCountConvention;
/// use bondlab_core::types::{Date, Frequency};
///
/// let bond: Bond = FixedRateBond::new(
///     1000.0,
///     0.05,
///     Date::from_ymd(2035, 1, 15).unwrap(),
///     Frequency::SemiAnnual,
///     DayCountConvention::Thirty360,
/// )
/// .unwrap()
/// .into();
///
/// let clean = price_from_yield(&bond, 0.05, Date::from_ymd(2025, 1, 15).unwrap()).unwrap();
/// assert!((clean - 1000.0).abs() < 1e-9);
/// ```
pub fn price_from_yield(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(price(bond, y, settlement)?.clean)
}

/// Dirty price at yield `y`: clean plus accrued.
pub fn dirty_price(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(price(bond, y, settlement)?.dirty)
}

/// Annual coupon income over the clean price.
pub fn current_yield(bond: &Bond, clean_price: f64) -> BondlabResult<f64> {
    if !clean_price.is_finite() || clean_price <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "clean price must be positive, got {clean_price}"
        )));
    }
    bond.validate()?;
    Ok(bond.face_value() * bond.coupon_rate() / clean_price)
}

/// Present value of timed flows at periodic yield `y`.
pub(crate) fn present_value(flows: &[TimedCashFlow], y: f64, m: f64) -> BondlabResult<f64> {
    let base = periodic_base(y, m)?;
    Ok(flows
        .iter()
        .map(|f| f.amount() * base.powf(-f.time * m))
        .sum())
}

/// Present value and its yield derivative; NaN outside the yield domain.
///
/// `dP/dy = -Σ PV·t / (1 + y/m)`.
pub(crate) fn value_and_slope(flows: &[(f64, f64)], y: f64, m: f64) -> (f64, f64) {
    let base = 1.0 + y / m;
    if base <= 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let (pv, weighted) = flows.iter().fold((0.0, 0.0), |(pv, weighted), &(t, amount)| {
        let value = amount * base.powf(-t * m);
        (pv + value, weighted + t * value)
    });
    (pv, -weighted / base)
}

pub(crate) fn periodic_base(y: f64, m: f64) -> BondlabResult<f64> {
    let base = 1.0 + y / m;
    if base <= 0.0 {
        return Err(BondlabError::calculation(format!(
            "yield {y} leaves no positive growth factor at {m} periods per year"
        )));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{FixedRateBond, FloatingRateNote, ZeroCouponBond};
    use approx::assert_relative_eq;
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::{BasisPoints, Frequency};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn ten_year() -> Bond {
        FixedRateBond::new(
            1000.0,
            0.05,
            date(2035, 1, 15),
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_par_bond_prices_at_face() {
        let result = price(&ten_year(), 0.05, date(2025, 1, 15)).unwrap();
        assert_relative_eq!(result.clean, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(result.dirty, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(result.accrued, 0.0);
    }

    #[test]
    fn test_dirty_is_clean_plus_accrued() {
        let settlement = date(2025, 4, 1);
        let result = price(&ten_year(), 0.045, settlement).unwrap();

        // 30/360: 76 of 180 days accrued.
        assert_relative_eq!(result.accrued, 25.0 * 76.0 / 180.0, epsilon = 1e-9);
        assert_relative_eq!(result.dirty, result.clean + result.accrued, epsilon = 1e-9);
        assert_relative_eq!(
            dirty_price(&ten_year(), 0.045, settlement).unwrap(),
            result.dirty,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_coupon_closed_form() {
        let bond: Bond =
            ZeroCouponBond::new(1000.0, date(2030, 1, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into();
        let clean = price_from_yield(&bond, 0.06, date(2025, 1, 15)).unwrap();

        assert_relative_eq!(clean, 1000.0 / 1.06f64.powi(5), epsilon = 1e-9);
        assert!((clean - 747.26).abs() < 0.005);
    }

    #[test]
    fn test_price_falls_as_yield_rises() {
        let bond = ten_year();
        let settlement = date(2025, 3, 10);
        let low = price_from_yield(&bond, 0.04, settlement).unwrap();
        let high = price_from_yield(&bond, 0.06, settlement).unwrap();
        assert!(low > 1000.0 && high < 1000.0);
    }

    #[test]
    fn test_floating_note_at_par_on_reset() {
        let bond: Bond = FloatingRateNote::new(
            100.0,
            BasisPoints::new(50.0).unwrap(),
            date(2028, 3, 15),
            Frequency::Quarterly,
            DayCountConvention::Act360,
            0.03,
        )
        .unwrap()
        .into();

        let clean = price_from_yield(&bond, 0.035, date(2025, 3, 15)).unwrap();
        assert_relative_eq!(clean, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_current_yield() {
        assert_relative_eq!(current_yield(&ten_year(), 950.0).unwrap(), 50.0 / 950.0);
        assert!(current_yield(&ten_year(), 0.0).is_err());
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(price(&ten_year(), f64::NAN, date(2025, 1, 15)).is_err());
        assert!(price(&ten_year(), -3.0, date(2025, 1, 15)).is_err());
        assert!(price(&ten_year(), 0.05, date(2035, 1, 15)).is_err());
    }
}
