//! Pricing off a zero curve.

use bondlab_core::error::ensure_finite;
use bondlab_core::types::Date;
use bondlab_core::BondlabResult;
use bondlab_curves::curve::discount_factor;
use bondlab_curves::YieldCurve;

use crate::bond::Bond;
use crate::cashflows::{discounting_flows_on, TimedCashFlow, Timeline};
use crate::pricing::accrued::accrued_on;
use crate::pricing::PriceResult;

/// Prices a bond by discounting each flow at `(1 + z(t))^(-t)`.
///
/// Callable and putable bonds are priced option-free; the lattice prices
/// the options.
pub fn price_from_curve(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
) -> BondlabResult<PriceResult> {
    price_from_curve_with_spread(bond, curve, settlement, 0.0)
}

/// Prices a bond at `(1 + z(t) + spread)^(-t)`, `spread` a decimal.
pub fn price_from_curve_with_spread(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
    spread: f64,
) -> BondlabResult<PriceResult> {
    ensure_finite("spread", spread)?;
    let timeline = Timeline::new(bond, settlement)?;
    let flows = discounting_flows_on(bond, &timeline)?;
    let accrued = accrued_on(bond, &timeline)?;
    let dirty = discount_on_curve(&flows, curve, spread)?;
    Ok(PriceResult::from_dirty(dirty, accrued))
}

/// Present value of timed flows on `curve` plus a flat spread.
pub(crate) fn discount_on_curve(
    flows: &[TimedCashFlow],
    curve: &YieldCurve,
    spread: f64,
) -> BondlabResult<f64> {
    flows.iter().try_fold(0.0, |pv, flow| {
        let rate = curve.rate_at(flow.time)? + spread;
        Ok(pv + flow.amount() * discount_factor(rate, flow.time)?)
    })
}
