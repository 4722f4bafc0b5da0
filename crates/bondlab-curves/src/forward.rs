//! Forward rates between spot points.
//!
//! With annually compounded spot rates `s1` at `t1` and `s2` at `t2`:
//!
//! ```text
//! f = ((1 + s2)^t2 / (1 + s1)^t1)^(1 / (t2 - t1)) - 1
//! ```
//!
//! [`spot_from_forwards`] inverts this by compounding a chain of forwards.

use serde::{Deserialize, Serialize};

use bondlab_core::{BondlabError, BondlabResult};

/// Annually compounded forward rate between `t1` and `t2`.
///
/// Requires `0 <= t1 < t2` and rates above -100 %.
///
/// ```rust
/// use bondlab_curves::forward::forward_rate;
///
/// let f = forward_rate(0.04, 1.0, 0.05, 2.0).unwrap();
/// assert!((f - (1.05f64.powi(2) / 1.04 - 1.0)).abs() < 1e-14);
/// ```
pub fn forward_rate(s1: f64, t1: f64, s2: f64, t2: f64) -> BondlabResult<f64> {
    if !(t1.is_finite() && t2.is_finite()) || t1 < 0.0 || t2 <= t1 {
        return Err(BondlabError::invalid_instrument(format!(
            "forward period must satisfy 0 <= t1 < t2, got t1 = {t1}, t2 = {t2}"
        )));
    }
    if !(s1.is_finite() && s2.is_finite()) || s1 <= -1.0 || s2 <= -1.0 {
        return Err(BondlabError::invalid_instrument(
            "spot rates must be finite and above -100%",
        ));
    }

    let growth = (1.0 + s2).powf(t2) / (1.0 + s1).powf(t1);
    Ok(growth.powf(1.0 / (t2 - t1)) - 1.0)
}

/// A forward rate applying over `[start, end]` years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardSegment {
    /// Start of the period in years.
    pub start: f64,
    /// End of the period in years.
    pub end: f64,
    /// Annually compounded forward rate.
    pub rate: f64,
}

impl ForwardSegment {
    /// Creates a forward segment.
    pub fn new(start: f64, end: f64, rate: f64) -> Self {
        Self { start, end, rate }
    }
}

/// Spot rate to the end of a contiguous forward chain starting at 0.
///
/// `(1 + s)^T = Π (1 + fᵢ)^(endᵢ - startᵢ)`
pub fn spot_from_forwards(forwards: &[ForwardSegment]) -> BondlabResult<f64> {
    let first = forwards
        .first()
        .ok_or_else(|| BondlabError::invalid_instrument("forward chain is empty"))?;
    if first.start.abs() > 1e-12 {
        return Err(BondlabError::invalid_instrument(
            "forward chain must start at time 0",
        ));
    }

    let mut log_growth = 0.0;
    let mut cursor = 0.0;
    for segment in forwards {
        if (segment.start - cursor).abs() > 1e-9 {
            return Err(BondlabError::invalid_instrument(format!(
                "forward chain has a gap or overlap at {cursor}"
            )));
        }
        if !(segment.end > segment.start) || !segment.rate.is_finite() || segment.rate <= -1.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "invalid forward segment [{}, {}] at {}",
                segment.start, segment.end, segment.rate
            )));
        }
        log_growth += (segment.end - segment.start) * segment.rate.ln_1p();
        cursor = segment.end;
    }

    Ok((log_growth / cursor).exp_m1())
}
