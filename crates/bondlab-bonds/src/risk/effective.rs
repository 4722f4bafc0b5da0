//! Effective duration and convexity.
//!
//! Symmetric finite differences over a price function of a parallel move:
//!
//! ```text
//! D = (P(-Δy) - P(+Δy)) / (2·P0·Δy)
//! C = (P(-Δy) + P(+Δy) - 2·P0) / (P0·Δy²)
//! ```
//!
//! The price function can be anything that reprices under a shift, which
//! is what makes this the measure for bonds with embedded options.

use serde::{Deserialize, Serialize};

use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;

use crate::bond::Bond;
use crate::pricing::{dirty_price, price_from_curve};

/// Default shift: 10 basis points.
pub const DEFAULT_EFFECTIVE_BUMP: f64 = 0.001;

/// Effective duration and convexity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRisk {
    /// Effective duration.
    pub duration: f64,
    /// Effective convexity.
    pub convexity: f64,
}

/// Effective measures from `price(shift)`, shifts in decimal.
pub fn effective_risk<F>(price: F, bump: f64) -> BondlabResult<EffectiveRisk>
where
    F: Fn(f64) -> BondlabResult<f64>,
{
    if !bump.is_finite() || bump <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "bump must be positive, got {bump}"
        )));
    }

    let base = price(0.0)?;
    if base <= 0.0 {
        return Err(BondlabError::calculation(format!(
            "base price {base} is not positive"
        )));
    }
    let down = price(-bump)?;
    let up = price(bump)?;

    Ok(EffectiveRisk {
        duration: (down - up) / (2.0 * base * bump),
        convexity: (down + up - 2.0 * base) / (base * bump * bump),
    })
}

/// Effective measures from shifting the yield.
pub fn effective_risk_on_yield(
    bond: &Bond,
    y: f64,
    settlement: Date,
    bump: f64,
) -> BondlabResult<EffectiveRisk> {
    effective_risk(|shift| dirty_price(bond, y + shift, settlement), bump)
}

/// Effective measures from shifting the whole curve.
pub fn effective_risk_on_curve(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
    bump: f64,
) -> BondlabResult<EffectiveRisk> {
    effective_risk(
        |shift| Ok(price_from_curve(bond, &curve.with_parallel_shift(shift), settlement)?.dirty),
        bump,
    )
}
