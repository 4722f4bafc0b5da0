//! Full analysis of a bond against a curve at a market price.

use log::debug;
use serde::{Deserialize, Serialize};

use bondlab_bonds::options::{HoLee, LatticePricer, LatticeValuation};
use bondlab_bonds::pricing::{
    price, price_from_curve, yield_to_worst, PriceResult, YieldSolver, YieldToWorst,
};
use bondlab_bonds::risk::{
    effective_risk, key_rate_durations, risk_metrics, EffectiveRisk, KeyRateDuration, RiskMetrics,
};
use bondlab_bonds::Bond;
use bondlab_core::types::{BasisPoints, Date};
use bondlab_core::BondlabResult;
use bondlab_curves::YieldCurve;

use crate::batch::map_batch;
use crate::config::EngineConfig;
use crate::spreads::{OasCalculator, OasResult, ZSpreadCalculator};

/// Everything [`BondAnalyzer::analyze`] computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondAnalysis {
    /// Clean, dirty and accrued at the yield to maturity.
    pub price: PriceResult,
    /// Yield to maturity.
    pub yield_to_maturity: f64,
    /// Yield to worst, for bonds with a call schedule.
    pub yield_to_worst: Option<YieldToWorst>,
    /// Analytic risk at the yield to maturity.
    pub risk: RiskMetrics,
    /// Curve-based effective risk; lattice-based for embedded options.
    pub effective: EffectiveRisk,
    /// Key-rate durations on the curve nodes.
    pub key_rates: Vec<KeyRateDuration>,
    /// Z-spread over the curve.
    pub z_spread: BasisPoints,
    /// OAS, for bonds with embedded options.
    pub oas: Option<OasResult>,
    /// Lattice valuation at the OAS, for bonds with embedded options.
    pub lattice: Option<LatticeValuation>,
}

/// Runs configured analyses.
#[derive(Debug, Clone, Default)]
pub struct BondAnalyzer {
    config: EngineConfig,
}

impl BondAnalyzer {
    /// Creates an analyzer after validating `config`.
    pub fn new(config: EngineConfig) -> BondlabResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates an analyzer from a TOML document.
    pub fn from_toml_str(source: &str) -> BondlabResult<Self> {
        Ok(Self {
            config: EngineConfig::from_toml_str(source)?,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The configured lattice pricer.
    pub fn lattice_pricer(&self) -> BondlabResult<LatticePricer<HoLee>> {
        LatticePricer::new(
            HoLee::new(self.config.lattice.volatility)?,
            self.config.lattice.steps_per_period,
        )
    }

    /// Analyses `bond` at `clean_price` against `curve`.
    pub fn analyze(
        &self,
        bond: &Bond,
        curve: &YieldCurve,
        clean_price: f64,
        settlement: Date,
    ) -> BondlabResult<BondAnalysis> {
        let solver = YieldSolver::new().with_config(self.config.yield_solver_config());
        let ytm = solver.solve(bond, clean_price, settlement)?.yield_value;
        let price_result = price(bond, ytm, settlement)?;
        let risk = risk_metrics(bond, ytm, settlement)?;

        let z_spread = ZSpreadCalculator::new(curve)
            .with_config(self.config.spread_solver_config())
            .calculate(bond, clean_price, settlement)?;
        let key_rates =
            key_rate_durations(bond, curve, settlement, self.config.risk.key_rate_bump())?;
        let bump = self.config.risk.bump();

        let (ytw, oas, lattice, effective) = if bond.exercise_schedule().is_some() {
            let pricer = self.lattice_pricer()?;
            let spread = &self.config.spread_solver;
            let oas = OasCalculator::new(pricer.clone())
                .with_config(self.config.spread_solver_config())
                .with_bracket(spread.oas_lower, spread.oas_upper)?
                .calculate(bond, curve, clean_price, settlement)?;
            let shift = oas.oas.as_decimal();

            let lattice = pricer.price_with_shift(bond, curve, settlement, shift)?;
            let effective = effective_risk(
                |dy| Ok(pricer.price_with_shift(bond, curve, settlement, shift + dy)?.dirty_price),
                bump,
            )?;
            let ytw = match bond {
                Bond::Callable(_) => Some(yield_to_worst(bond, clean_price, settlement)?),
                _ => None,
            };
            (ytw, Some(oas), Some(lattice), effective)
        } else {
            let spread_curve = curve.with_parallel_shift(z_spread.as_decimal());
            let effective = effective_risk(
                |dy| {
                    let shifted = spread_curve.with_parallel_shift(dy);
                    Ok(price_from_curve(bond, &shifted, settlement)?.dirty)
                },
                bump,
            )?;
            (None, None, None, effective)
        };

        debug!(
            "analyzed {} bond: ytm {ytm:.6}, z {:.2} bp, effective duration {:.4}",
            bond.kind(),
            z_spread.value(),
            effective.duration
        );

        Ok(BondAnalysis {
            price: price_result,
            yield_to_maturity: ytm,
            yield_to_worst: ytw,
            risk,
            effective,
            key_rates,
            z_spread,
            oas,
            lattice,
        })
    }

    /// Analyses a batch of `(bond, clean price)` pairs, in parallel with
    /// the `parallel` feature.
    pub fn analyze_many(
        &self,
        quotes: &[(Bond, f64)],
        curve: &YieldCurve,
        settlement: Date,
    ) -> Vec<BondlabResult<BondAnalysis>> {
        map_batch(quotes, |(bond, clean_price)| {
            self.analyze(bond, curve, *clean_price, settlement)
        })
    }
}
