//! Engine configuration.
//!
//! Every field has a default, so a TOML document only needs the values it
//! changes:
//!
//! ```toml
//! [lattice]
//! volatility = 0.012
//!
//! [risk]
//! bump_bps = 25.0
//! ```

use serde::{Deserialize, Serialize};

use bondlab_bonds::options::DEFAULT_STEPS_PER_PERIOD;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_math::solvers::SolverConfig;

/// Yield solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldSolverSettings {
    /// Price tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: u32,
}

impl Default for YieldSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Spread solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadSolverSettings {
    /// Price tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: u32,
    /// Lower end of the OAS search interval (decimal).
    pub oas_lower: f64,
    /// Upper end of the OAS search interval (decimal).
    pub oas_upper: f64,
}

impl Default for SpreadSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            oas_lower: -0.05,
            oas_upper: 0.20,
        }
    }
}

/// Lattice settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeSettings {
    /// Tree steps per coupon period.
    pub steps_per_period: usize,
    /// Absolute short-rate volatility (0.01 = 100 bp).
    pub volatility: f64,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            steps_per_period: DEFAULT_STEPS_PER_PERIOD,
            volatility: 0.01,
        }
    }
}

/// Risk bump settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Parallel shift for effective measures, in basis points.
    pub bump_bps: f64,
    /// Node shift for key-rate durations, in basis points.
    pub key_rate_bump_bps: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            bump_bps: 10.0,
            key_rate_bump_bps: 1.0,
        }
    }
}

impl RiskSettings {
    /// Effective bump in decimal.
    pub fn bump(&self) -> f64 {
        self.bump_bps / 10_000.0
    }

    /// Key-rate bump in decimal.
    pub fn key_rate_bump(&self) -> f64 {
        self.key_rate_bump_bps / 10_000.0
    }
}

/// Configuration for [`BondAnalyzer`](crate::BondAnalyzer) runs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Yield solver.
    pub yield_solver: YieldSolverSettings,
    /// Z-spread and OAS solvers.
    pub spread_solver: SpreadSolverSettings,
    /// Option lattice.
    pub lattice: LatticeSettings,
    /// Finite-difference bumps.
    pub risk: RiskSettings,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> BondlabResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| BondlabError::invalid_instrument(format!("engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every numeric setting is positive.
    pub fn validate(&self) -> BondlabResult<()> {
        positive("yield_solver.tolerance", self.yield_solver.tolerance)?;
        positive("spread_solver.tolerance", self.spread_solver.tolerance)?;
        positive("lattice.volatility", self.lattice.volatility)?;
        positive("risk.bump_bps", self.risk.bump_bps)?;
        positive("risk.key_rate_bump_bps", self.risk.key_rate_bump_bps)?;

        if self.yield_solver.max_iterations == 0 || self.spread_solver.max_iterations == 0 {
            return Err(BondlabError::invalid_instrument("solver iteration caps must be positive"));
        }
        if self.lattice.steps_per_period == 0 {
            return Err(BondlabError::invalid_instrument(
                "lattice.steps_per_period must be positive",
            ));
        }
        let (lower, upper) = (self.spread_solver.oas_lower, self.spread_solver.oas_upper);
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
            return Err(BondlabError::invalid_instrument(format!(
                "OAS interval [{lower}, {upper}] is empty"
            )));
        }
        Ok(())
    }

    /// Yield solver configuration.
    pub fn yield_solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.yield_solver.tolerance, self.yield_solver.max_iterations)
    }

    /// Spread solver configuration.
    pub fn spread_solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.spread_solver.tolerance, self.spread_solver.max_iterations)
    }
}

fn positive(name: &str, value: f64) -> BondlabResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}
