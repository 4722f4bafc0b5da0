//! Accrued interest.
//!
//! [`accrued_interest`] follows the bond's own convention: the period
//! coupon times the elapsed share of the period, counted in the
//! convention's days from the accrual start (the previous coupon date, or
//! the issue date inside a first period).
//!
//! The `accrued_interest_*` variants instead take
//! `face × annual rate × year_fraction(accrual start, settlement)` under a
//! fixed convention, for cross-checking against other systems.
//!
//! Arithmetic runs in `Decimal`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use bondlab_core::daycounts::DayCountConvention;
use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};

use crate::bond::Bond;
use crate::cashflows::Timeline;

/// Accrued interest at `settlement` under the bond's day count.
///
/// Zero coupons accrue nothing.
pub fn accrued_interest(bond: &Bond, settlement: Date) -> BondlabResult<f64> {
    let timeline = Timeline::new(bond, settlement)?;
    accrued_on(bond, &timeline)
}

pub(crate) fn accrued_on(bond: &Bond, timeline: &Timeline) -> BondlabResult<f64> {
    let Some(period) = timeline.coupon_period() else {
        return Ok(0.0);
    };

    let coupon = to_decimal("coupon", bond.coupon_amount())?;
    let fraction = period.elapsed_fraction(timeline.settlement(), bond.day_count())?;
    to_f64(coupon * fraction)
}

/// Accrued interest at `settlement` under `convention`.
pub fn accrued_interest_under(
    bond: &Bond,
    settlement: Date,
    convention: DayCountConvention,
) -> BondlabResult<f64> {
    let timeline = Timeline::new(bond, settlement)?;
    let Some(period) = timeline.coupon_period() else {
        return Ok(0.0);
    };

    let face = to_decimal("face value", bond.face_value())?;
    let rate = to_decimal("coupon rate", bond.coupon_rate())?;
    let fraction = convention.raw_year_fraction(period.accrual_start, settlement);
    to_f64(face * rate * fraction.max(Decimal::ZERO))
}

/// Accrued interest under 30/360.
pub fn accrued_interest_thirty_360(bond: &Bond, settlement: Date) -> BondlabResult<f64> {
    accrued_interest_under(bond, settlement, DayCountConvention::Thirty360)
}

/// Accrued interest under ACT/360.
pub fn accrued_interest_act_360(bond: &Bond, settlement: Date) -> BondlabResult<f64> {
    accrued_interest_under(bond, settlement, DayCountConvention::Act360)
}

/// Accrued interest under ACT/365F.
pub fn accrued_interest_act_365(bond: &Bond, settlement: Date) -> BondlabResult<f64> {
    accrued_interest_under(bond, settlement, DayCountConvention::Act365)
}

/// Accrued interest under ACT/ACT ISDA.
pub fn accrued_interest_act_act(bond: &Bond, settlement: Date) -> BondlabResult<f64> {
    accrued_interest_under(bond, settlement, DayCountConvention::ActActIsda)
}

fn to_decimal(name: &str, value: f64) -> BondlabResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        BondlabError::invalid_instrument(format!("{name} {value} is not representable"))
    })
}

fn to_f64(value: Decimal) -> BondlabResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| BondlabError::calculation(format!("accrued {value} does not fit in f64")))
}
