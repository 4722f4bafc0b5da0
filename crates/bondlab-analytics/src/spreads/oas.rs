//! Option-adjusted spread.
//!
//! The OAS is the parallel shift of the curve at which the lattice value
//! of the bond, options included, equals its market price. The tree is
//! recalibrated to every trial curve, so for an option-free bond the OAS
//! coincides with the Z-spread. The difference between the two is the
//! option cost in spread terms.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use bondlab_bonds::options::{LatticePricer, ShortRateModel};
use bondlab_bonds::pricing::accrued_interest;
use bondlab_bonds::Bond;
use bondlab_core::types::{BasisPoints, Date};
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;
use bondlab_math::solvers::{brent, SolverConfig};

use super::z_spread;

/// Default search interval for the shift, in decimal.
pub const DEFAULT_OAS_BRACKET: (f64, f64) = (-0.05, 0.20);

/// OAS together with the spread it is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OasResult {
    /// Option-adjusted spread.
    pub oas: BasisPoints,
    /// Z-spread at the same price.
    pub z_spread: BasisPoints,
    /// `z_spread - oas`: positive for callables, negative for putables.
    pub option_cost: BasisPoints,
    /// Lattice value of the embedded option at the OAS.
    pub option_value: f64,
}

/// OAS calculator over a lattice pricer.
#[derive(Debug, Clone)]
pub struct OasCalculator<M: ShortRateModel> {
    pricer: LatticePricer<M>,
    config: SolverConfig,
    bracket: (f64, f64),
}

impl<M: ShortRateModel> OasCalculator<M> {
    /// Creates a calculator around `pricer`.
    pub fn new(pricer: LatticePricer<M>) -> Self {
        Self {
            pricer,
            config: SolverConfig::new(1e-10, 100),
            bracket: DEFAULT_OAS_BRACKET,
        }
    }

    /// Replaces the solver configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the shift interval searched by Brent.
    pub fn with_bracket(mut self, lower: f64, upper: f64) -> BondlabResult<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
            return Err(BondlabError::invalid_instrument(format!(
                "OAS bracket [{lower}, {upper}] is empty"
            )));
        }
        self.bracket = (lower, upper);
        Ok(self)
    }

    /// The lattice pricer.
    pub fn pricer(&self) -> &LatticePricer<M> {
        &self.pricer
    }

    /// OAS for a clean market price.
    pub fn calculate(
        &self,
        bond: &Bond,
        curve: &YieldCurve,
        clean_price: f64,
        settlement: Date,
    ) -> BondlabResult<OasResult> {
        if !clean_price.is_finite() || clean_price <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "clean price must be positive, got {clean_price}"
            )));
        }
        let target = clean_price + accrued_interest(bond, settlement)?;

        let objective = |shift: f64| {
            self.pricer
                .price_with_shift(bond, curve, settlement, shift)
                .map_or(f64::NAN, |v| v.dirty_price - target)
        };

        let (lower, upper) = self.bracket;
        let result = brent(objective, lower, upper, &self.config).map_err(|e| {
            warn!("{} bond OAS solve failed on [{lower}, {upper}]: {e}", bond.kind());
            BondlabError::from(e)
        })?;

        let valuation = self.pricer.price_with_shift(bond, curve, settlement, result.root)?;
        let z = z_spread(bond, curve, clean_price, settlement)?;
        let oas = BasisPoints::from_decimal(result.root)?;

        debug!(
            "{} bond OAS {:.4} bp (Z {:.4} bp) after {} iterations",
            bond.kind(),
            oas.value(),
            z.value(),
            result.iterations
        );

        Ok(OasResult {
            oas,
            z_spread: z,
            option_cost: BasisPoints::new(z.value() - oas.value())?,
            option_value: valuation.option_value,
        })
    }
}

/// OAS with a Ho-Lee lattice at `volatility` and default settings.
pub fn oas(
    bond: &Bond,
    curve: &YieldCurve,
    clean_price: f64,
    settlement: Date,
    volatility: f64,
) -> BondlabResult<OasResult> {
    OasCalculator::new(LatticePricer::ho_lee(volatility)?)
        .calculate(bond, curve, clean_price, settlement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bondlab_bonds::bond::{ExerciseEntry, FixedRateBond};
    use bondlab_bonds::pricing::price_from_curve_with_spread;
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;
    use bondlab_curves::{CurveMethod, YieldCurvePoint};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn curve() -> YieldCurve {
        YieldCurve::new(
            vec![
                YieldCurvePoint::new(1.0, 0.038),
                YieldCurvePoint::new(5.0, 0.042),
                YieldCurvePoint::new(10.0, 0.046),
            ],
            CurveMethod::Linear,
        )
        .unwrap()
    }

    fn base() -> FixedRateBond {
        FixedRateBond::new(
            100.0,
            0.05,
            date(2034, 10, 1),
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
    }

    fn schedule() -> Vec<ExerciseEntry> {
        vec![ExerciseEntry::new(date(2028, 10, 1), 100.0)]
    }

    #[test]
    fn test_option_free_oas_equals_z_spread() {
        let settlement = date(2025, 4, 1);
        let bond = Bond::from(base());
        let clean = price_from_curve_with_spread(&bond, &curve(), settlement, 0.008).unwrap().clean;

        let result = oas(&bond, &curve(), clean, settlement, 0.01).unwrap();
        assert_relative_eq!(result.oas.value(), 80.0, epsilon = 1e-4);
        assert_relative_eq!(result.z_spread.value(), 80.0, epsilon = 1e-4);
        assert!(result.option_cost.value().abs() < 1e-4);
        assert_eq!(result.option_value, 0.0);
    }

    #[test]
    fn test_callable_oas_below_z_spread() {
        let settlement = date(2025, 4, 1);
        let bond = Bond::callable(base(), schedule()).unwrap();
        let calc = OasCalculator::new(LatticePricer::ho_lee(0.01).unwrap());

        let model_price =
            calc.pricer().price_with_shift(&bond, &curve(), settlement, 0.005).unwrap();
        let result = calc.calculate(&bond, &curve(), model_price.clean_price, settlement).unwrap();

        assert_relative_eq!(result.oas.value(), 50.0, epsilon = 1e-4);
        assert!(result.z_spread.value() > result.oas.value());
        assert!(result.option_cost.value() > 0.0);
        assert!(result.option_value > 0.0);
    }

    #[test]
    fn test_putable_option_cost_is_negative() {
        let settlement = date(2025, 4, 1);
        let bond = Bond::putable(base(), schedule()).unwrap();
        let calc = OasCalculator::new(LatticePricer::ho_lee(0.01).unwrap());

        let model_price =
            calc.pricer().price_with_shift(&bond, &curve(), settlement, 0.003).unwrap();
        let result = calc.calculate(&bond, &curve(), model_price.clean_price, settlement).unwrap();

        assert_relative_eq!(result.oas.value(), 30.0, epsilon = 1e-4);
        assert!(result.option_cost.value() < 0.0);
    }

    #[test]
    fn test_price_outside_bracket_fails() {
        let settlement = date(2025, 4, 1);
        let bond = Bond::callable(base(), schedule()).unwrap();
        let calc = OasCalculator::new(LatticePricer::ho_lee(0.01).unwrap())
            .with_bracket(0.0, 0.01)
            .unwrap();

        assert!(calc.calculate(&bond, &curve(), 60.0, settlement).is_err());
        assert!(OasCalculator::new(LatticePricer::ho_lee(0.01).unwrap())
            .with_bracket(0.02, 0.01)
            .is_err());
    }
}
