//! Key-rate durations.
//!
//! Each curve node is shifted on its own (the curve returns a new value)
//! and the bond repriced: `KRD = (P- - P+) / (2·P0·Δy)`. On knot curves
//! the node durations add up to the curve effective duration.

use serde::{Deserialize, Serialize};

use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;

use crate::bond::Bond;
use crate::pricing::price_from_curve;

/// Default node shift: 1 basis point.
pub const DEFAULT_KEY_RATE_BUMP: f64 = 0.0001;

/// Sensitivity to one curve node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyRateDuration {
    /// Node maturity in years.
    pub maturity: f64,
    /// Duration with respect to that node.
    pub duration: f64,
}

/// Key-rate duration for node `index`.
pub fn key_rate_duration(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
    index: usize,
    bump: f64,
) -> BondlabResult<KeyRateDuration> {
    let base = price_from_curve(bond, curve, settlement)?.dirty;
    node_duration(bond, curve, settlement, index, bump, base)
}

/// Key-rate durations for every node of `curve`.
pub fn key_rate_durations(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
    bump: f64,
) -> BondlabResult<Vec<KeyRateDuration>> {
    let base = price_from_curve(bond, curve, settlement)?.dirty;
    (0..curve.len())
        .map(|index| node_duration(bond, curve, settlement, index, bump, base))
        .collect()
}

fn node_duration(
    bond: &Bond,
    curve: &YieldCurve,
    settlement: Date,
    index: usize,
    bump: f64,
    base: f64,
) -> BondlabResult<KeyRateDuration> {
    if !bump.is_finite() || bump <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "key rate bump must be positive, got {bump}"
        )));
    }
    let down = price_from_curve(bond, &curve.with_node_shift(index, -bump)?, settlement)?.dirty;
    let up = price_from_curve(bond, &curve.with_node_shift(index, bump)?, settlement)?.dirty;

    Ok(KeyRateDuration {
        maturity: curve.points()[index].maturity,
        duration: (down - up) / (2.0 * base * bump),
    })
}
