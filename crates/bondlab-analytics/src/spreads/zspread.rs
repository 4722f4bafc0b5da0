//! Z-spread (zero-volatility spread).
//!
//! The Z-spread is the constant spread that, added to every zero rate of
//! the curve, makes the discounted cash flows equal the market price:
//!
//! ```text
//! Dirty Price = Σ CF_i · (1 + z(t_i) + s)^(-t_i)
//! ```

use log::{debug, warn};

use bondlab_bonds::pricing::{accrued_interest, price_from_curve_with_spread};
use bondlab_bonds::Bond;
use bondlab_core::types::{BasisPoints, Date};
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;
use bondlab_math::solvers::{newton_raphson_numerical, SolverConfig};

/// Z-spread calculator.
#[derive(Debug, Clone)]
pub struct ZSpreadCalculator<'a> {
    curve: &'a YieldCurve,
    config: SolverConfig,
}

impl<'a> ZSpreadCalculator<'a> {
    /// Creates a calculator on `curve`.
    ///
    /// Default tolerance is 1e-10 on price.
    pub fn new(curve: &'a YieldCurve) -> Self {
        Self {
            curve,
            config: SolverConfig::new(1e-10, 100),
        }
    }

    /// Replaces the solver configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Z-spread for a clean market price.
    pub fn calculate(
        &self,
        bond: &Bond,
        clean_price: f64,
        settlement: Date,
    ) -> BondlabResult<BasisPoints> {
        if !clean_price.is_finite() || clean_price <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "clean price must be positive, got {clean_price}"
            )));
        }
        let target = clean_price + accrued_interest(bond, settlement)?;

        let objective =
            |s: f64| self.price_at_spread(bond, settlement, s).unwrap_or(f64::NAN) - target;

        let result = newton_raphson_numerical(objective, 0.0, &self.config).map_err(|e| {
            warn!("{} bond Z-spread solve failed: {e}", bond.kind());
            BondlabError::from(e)
        })?;

        debug!(
            "{} bond Z-spread {:.4} bp after {} iterations",
            bond.kind(),
            result.root * 10_000.0,
            result.iterations
        );
        BasisPoints::from_decimal(result.root)
    }

    /// Dirty price at spread `spread` (decimal).
    pub fn price_at_spread(
        &self,
        bond: &Bond,
        settlement: Date,
        spread: f64,
    ) -> BondlabResult<f64> {
        Ok(price_from_curve_with_spread(bond, self.curve, settlement, spread)?.dirty)
    }
}

/// Z-spread for a clean market price with default settings.
pub fn z_spread(
    bond: &Bond,
    curve: &YieldCurve,
    clean_price: f64,
    settlement: Date,
) -> BondlabResult<BasisPoints> {
    ZSpreadCalculator::new(curve).calculate(bond, clean_price, settlement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bondlab_bonds::bond::{FixedRateBond, ZeroCouponBond};
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;
    use bondlab_curves::{CurveMethod, YieldCurvePoint};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn curve() -> YieldCurve {
        YieldCurve::new(
            vec![
                YieldCurvePoint::new(1.0, 0.040),
                YieldCurvePoint::new(3.0, 0.042),
                YieldCurvePoint::new(7.0, 0.045),
                YieldCurvePoint::new(10.0, 0.047),
            ],
            CurveMethod::Linear,
        )
        .unwrap()
    }

    fn bond() -> Bond {
        FixedRateBond::new(
            100.0,
            0.055,
            date(2032, 6, 15),
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_recovers_known_spread() {
        let settlement = date(2025, 2, 20);
        let quoted = price_from_curve_with_spread(&bond(), &curve(), settlement, 0.0125).unwrap();

        let spread = z_spread(&bond(), &curve(), quoted.clean, settlement).unwrap();
        assert_relative_eq!(spread.value(), 125.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_spread_at_curve_price() {
        let settlement = date(2025, 2, 20);
        let quoted = price_from_curve_with_spread(&bond(), &curve(), settlement, 0.0).unwrap();

        let spread = z_spread(&bond(), &curve(), quoted.clean, settlement).unwrap();
        assert!(spread.value().abs() < 1e-6);
    }

    #[test]
    fn test_negative_spread_for_rich_bond() {
        let zero: Bond =
            ZeroCouponBond::new(100.0, date(2030, 2, 20), DayCountConvention::Thirty360)
                .unwrap()
                .into();
        let settlement = date(2025, 2, 20);
        let fair = price_from_curve_with_spread(&zero, &curve(), settlement, 0.0).unwrap();

        let spread = z_spread(&zero, &curve(), fair.clean + 1.0, settlement).unwrap();
        assert!(spread.value() < 0.0);

        let zero_curve = curve();
        let calc = ZSpreadCalculator::new(&zero_curve);
        let repriced = calc.price_at_spread(&zero, settlement, spread.as_decimal()).unwrap();
        assert_relative_eq!(repriced, fair.clean + 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_price_at_spread_matches_curve_pricing_mid_period() {
        let settlement = date(2025, 4, 3);
        let zero_curve = curve();
        let calc = ZSpreadCalculator::new(&zero_curve);

        let dirty = calc.price_at_spread(&bond(), settlement, 0.0075).unwrap();
        let priced = price_from_curve_with_spread(&bond(), &curve(), settlement, 0.0075).unwrap();
        assert_eq!(dirty, priced.dirty);
        assert!(priced.accrued > 0.0);
    }

    #[test]
    fn test_rejects_bad_price() {
        assert!(z_spread(&bond(), &curve(), -5.0, date(2025, 2, 20)).is_err());
        assert!(z_spread(&bond(), &curve(), f64::NAN, date(2025, 2, 20)).is_err());
    }
}
