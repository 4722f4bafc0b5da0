//! Risk metrics for bonds.
//!
//! Analytic measures at a yield, from the same flows and times as
//! [`price`](crate::pricing::price):
//!
//! ```text
//! Macaulay  = Σ t·PV / P
//! Modified  = Macaulay / (1 + y/m)
//! Convexity = Σ PV·t·(t + 1/m) / (P·(1 + y/m)²)
//! DV01      = Modified · P · 0.0001
//! ```
//!
//! `P` is the dirty price. Finite-difference measures live in
//! [`effective`] and [`key_rate`].

pub mod effective;
pub mod key_rate;

pub use effective::{
    effective_risk, effective_risk_on_curve, effective_risk_on_yield, EffectiveRisk,
    DEFAULT_EFFECTIVE_BUMP,
};
pub use key_rate::{key_rate_duration, key_rate_durations, KeyRateDuration, DEFAULT_KEY_RATE_BUMP};

use serde::{Deserialize, Serialize};

use bondlab_core::error::ensure_finite;
use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};

use crate::bond::Bond;
use crate::cashflows::{discounting_flows_on, Timeline};
use crate::pricing::periodic_base;

/// Analytic risk at a yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Macaulay duration in years.
    pub macaulay: f64,
    /// Modified duration.
    pub modified: f64,
    /// Convexity.
    pub convexity: f64,
    /// Price change for a one basis point yield move, per the bond's face.
    pub dv01: f64,
}

impl RiskMetrics {
    /// Second-order price change estimate for a yield move `dy`.
    ///
    /// `ΔP ≈ -D·P·Δy + ½·C·P·Δy²`
    pub fn estimate_price_change(&self, dirty_price: f64, dy: f64) -> f64 {
        -self.modified * dirty_price * dy + 0.5 * self.convexity * dirty_price * dy * dy
    }
}

/// Macaulay, modified, convexity and DV01 in one pass.
pub fn risk_metrics(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<RiskMetrics> {
    ensure_finite("yield", y)?;
    let timeline = Timeline::new(bond, settlement)?;
    let flows = discounting_flows_on(bond, &timeline)?;
    let m = bond.periods_per_year();
    let base = periodic_base(y, m)?;

    let mut pv = 0.0;
    let mut time_weighted = 0.0;
    let mut convexity_weighted = 0.0;
    for flow in &flows {
        let value = flow.amount() * base.powf(-flow.time * m);
        pv += value;
        time_weighted += flow.time * value;
        convexity_weighted += value * flow.time * (flow.time + 1.0 / m);
    }

    if pv <= 0.0 {
        return Err(BondlabError::calculation(format!(
            "{} bond has non-positive present value {pv}",
            bond.kind()
        )));
    }

    let macaulay = time_weighted / pv;
    let modified = macaulay / base;
    Ok(RiskMetrics {
        macaulay,
        modified,
        convexity: convexity_weighted / (pv * base * base),
        dv01: modified * pv * 1e-4,
    })
}

/// Macaulay duration in years.
pub fn macaulay_duration(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(risk_metrics(bond, y, settlement)?.macaulay)
}

/// Modified duration.
pub fn modified_duration(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(risk_metrics(bond, y, settlement)?.modified)
}

/// Convexity.
pub fn convexity(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(risk_metrics(bond, y, settlement)?.convexity)
}

/// Dollar value of a basis point.
pub fn dv01(bond: &Bond, y: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(risk_metrics(bond, y, settlement)?.dv01)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{FixedRateBond, ZeroCouponBond};
    use crate::pricing::dirty_price;
    use approx::assert_relative_eq;
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;

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
    fn test_zero_coupon_macaulay_is_maturity() {
        let bond: Bond =
            ZeroCouponBond::new(1000.0, date(2030, 1, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into();
        let metrics = risk_metrics(&bond, 0.06, date(2025, 1, 15)).unwrap();

        assert_relative_eq!(metrics.macaulay, 5.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.modified, 5.0 / 1.06, epsilon = 1e-12);
        assert_relative_eq!(metrics.convexity, 5.0 * 6.0 / 1.06f64.powi(2), epsilon = 1e-10);
    }

    #[test]
    fn test_par_bond_duration() {
        let metrics = risk_metrics(&ten_year(), 0.05, date(2025, 1, 15)).unwrap();

        // Closed form for a par bond: (1 - (1+i)^-n) / i periods, over m.
        let i: f64 = 0.025;
        let expected_modified = (1.0 - (1.0 + i).powi(-20)) / i / 2.0;
        assert_relative_eq!(metrics.modified, expected_modified, epsilon = 1e-10);
        assert!(metrics.macaulay > metrics.modified);
        assert!(metrics.macaulay < 10.0);
        assert_relative_eq!(metrics.dv01, metrics.modified * 1000.0 * 1e-4, epsilon = 1e-10);
    }

    #[test]
    fn test_duration_predicts_price_move() {
        let bond = ten_year();
        let settlement = date(2025, 5, 20);
        let y = 0.048;
        let dy = 0.0005;

        let metrics = risk_metrics(&bond, y, settlement).unwrap();
        let p0 = dirty_price(&bond, y, settlement).unwrap();
        let p1 = dirty_price(&bond, y + dy, settlement).unwrap();

        let first_order = -metrics.modified * dy;
        let actual = (p1 - p0) / p0;
        assert!((actual - first_order).abs() < metrics.convexity * dy * dy);

        let estimate = metrics.estimate_price_change(p0, dy);
        assert!((p0 + estimate - p1).abs() < 1e-3);
    }

    #[test]
    fn test_individual_accessors_agree() {
        let bond = ten_year();
        let settlement = date(2025, 5, 20);
        let all = risk_metrics(&bond, 0.05, settlement).unwrap();

        assert_eq!(macaulay_duration(&bond, 0.05, settlement).unwrap(), all.macaulay);
        assert_eq!(modified_duration(&bond, 0.05, settlement).unwrap(), all.modified);
        assert_eq!(convexity(&bond, 0.05, settlement).unwrap(), all.convexity);
        assert_eq!(dv01(&bond, 0.05, settlement).unwrap(), all.dv01);
    }
}
