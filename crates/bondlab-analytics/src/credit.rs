//! Closed-form credit analytics.
//!
//! The credit triangle ties a spread to a constant default intensity:
//!
//! ```text
//! λ     = s / (1 - R)
//! PD(T) = 1 - exp(-λ·T)
//! ```
//!
//! The distance to default is the Merton-style standard normal quantile
//! implied by `PD(T)`: `DD = -Φ⁻¹(PD)`. Given a physical (historical)
//! annual default rate `p`, the spread splits into an expected-loss part
//! `p·(1 - R)` and a residual risk premium.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use bondlab_core::error::ensure_finite;
use bondlab_core::types::BasisPoints;
use bondlab_core::{BondlabError, BondlabResult};

/// Credit decomposition of a spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditDecomposition {
    /// Risk-neutral default intensity per year.
    pub hazard_rate: f64,
    /// Cumulative default probability to the horizon.
    pub default_probability: f64,
    /// `1 - default_probability`.
    pub survival_probability: f64,
    /// Standard normal distance to default at the horizon.
    pub distance_to_default: f64,
    /// Spread explained by physical expected loss, if a physical default
    /// rate was supplied.
    pub expected_loss_spread: Option<BasisPoints>,
    /// Spread left after expected loss.
    pub risk_premium: Option<BasisPoints>,
}

/// Hazard rate `s / (1 - R)` for a spread and recovery rate.
pub fn hazard_rate(spread: BasisPoints, recovery_rate: f64) -> BondlabResult<f64> {
    validate_recovery(recovery_rate)?;
    if spread.value() < 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "credit spread must be non-negative, got {spread}"
        )));
    }
    Ok(spread.as_decimal() / (1.0 - recovery_rate))
}

/// Cumulative risk-neutral default probability to `maturity` years.
///
/// ```rust
/// use bondlab_analytics::credit::default_probability;
/// use bondlab_core::types::BasisPoints;
///
/// // 240 bp at 40 % recovery: 4 % a year.
/// let pd = default_probability(BasisPoints::new(240.0).unwrap(), 0.4, 5.0).unwrap();
/// assert!((pd - (1.0 - (-0.2f64).exp())).abs() < 1e-12);
/// ```
pub fn default_probability(
    spread: BasisPoints,
    recovery_rate: f64,
    maturity: f64,
) -> BondlabResult<f64> {
    validate_maturity(maturity)?;
    let lambda = hazard_rate(spread, recovery_rate)?;
    Ok(1.0 - (-lambda * maturity).exp())
}

/// Survival probability to `maturity` years.
pub fn survival_probability(
    spread: BasisPoints,
    recovery_rate: f64,
    maturity: f64,
) -> BondlabResult<f64> {
    Ok(1.0 - default_probability(spread, recovery_rate, maturity)?)
}

/// Full decomposition of `spread` at horizon `maturity`.
///
/// The spread must be strictly positive so the distance to default is
/// finite.
pub fn decompose_credit_spread(
    spread: BasisPoints,
    recovery_rate: f64,
    maturity: f64,
    physical_default_rate: Option<f64>,
) -> BondlabResult<CreditDecomposition> {
    if spread.value() <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "credit spread must be positive, got {spread}"
        )));
    }
    let hazard = hazard_rate(spread, recovery_rate)?;
    let pd = default_probability(spread, recovery_rate, maturity)?;
    let distance_to_default = -standard_normal()?.inverse_cdf(pd);

    let (expected_loss_spread, risk_premium) = match physical_default_rate {
        Some(rate) => {
            ensure_finite("physical default rate", rate)?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(BondlabError::invalid_instrument(format!(
                    "physical default rate must be in [0, 1], got {rate}"
                )));
            }
            let expected_loss = BasisPoints::from_decimal(rate * (1.0 - recovery_rate))?;
            let premium = BasisPoints::new(spread.value() - expected_loss.value())?;
            (Some(expected_loss), Some(premium))
        }
        None => (None, None),
    };

    Ok(CreditDecomposition {
        hazard_rate: hazard,
        default_probability: pd,
        survival_probability: 1.0 - pd,
        distance_to_default,
        expected_loss_spread,
        risk_premium,
    })
}

fn standard_normal() -> BondlabResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| BondlabError::calculation(format!("standard normal: {e}")))
}

fn validate_recovery(recovery_rate: f64) -> BondlabResult<()> {
    if !recovery_rate.is_finite() || !(0.0..1.0).contains(&recovery_rate) {
        return Err(BondlabError::invalid_instrument(format!(
            "recovery rate must be in [0, 1), got {recovery_rate}"
        )));
    }
    Ok(())
}

fn validate_maturity(maturity: f64) -> BondlabResult<()> {
    if !maturity.is_finite() || maturity <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "horizon must be positive, got {maturity}"
        )));
    }
    Ok(())
}
