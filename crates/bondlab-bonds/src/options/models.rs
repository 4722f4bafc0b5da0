//! Short-rate models for lattice construction.
//!
//! # Ho-Lee
//!
//! ```text
//! dr = θ(t)·dt + σ·dW
//! ```
//!
//! On the lattice the node rate is `r(i, j) = θ_i + (2j - i)·Δx` with
//! `Δx = σ·√dt` for the regular step `dt`. Each `θ_i` is fixed by forward
//! induction over Arrow-Debreu prices `Q(i, j)` so the tree reproduces
//! the curve's discount factor at every node time:
//!
//! ```text
//! θ_i = ln( Σ_j Q(i, j)·exp(-(2j - i)·Δx·h_i) / P(t_{i+1}) ) / h_i
//! ```
//!
//! `σ` is an absolute (normal) short-rate volatility, so rates can go
//! negative.

use log::debug;

use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;

use super::BinomialTree;

/// A model that builds a curve-consistent short-rate tree.
pub trait ShortRateModel: Send + Sync {
    /// Model name for diagnostics.
    fn name(&self) -> &'static str;

    /// Short-rate volatility.
    fn volatility(&self) -> f64;

    /// Builds a tree on node `times` (starting at 0) whose zero-coupon
    /// prices match `curve`. `regular_step` sets the state spacing.
    fn build_tree(
        &self,
        curve: &YieldCurve,
        times: &[f64],
        regular_step: f64,
    ) -> BondlabResult<BinomialTree>;
}

/// Ho-Lee normal short-rate model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoLee {
    volatility: f64,
}

impl HoLee {
    /// Creates the model with absolute volatility `volatility` (0.01 =
    /// 100 bp a year).
    pub fn new(volatility: f64) -> BondlabResult<Self> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "volatility must be non-negative and finite, got {volatility}"
            )));
        }
        Ok(Self { volatility })
    }
}

impl ShortRateModel for HoLee {
    fn name(&self) -> &'static str {
        "Ho-Lee"
    }

    fn volatility(&self) -> f64 {
        self.volatility
    }

    fn build_tree(
        &self,
        curve: &YieldCurve,
        times: &[f64],
        regular_step: f64,
    ) -> BondlabResult<BinomialTree> {
        if !regular_step.is_finite() || regular_step <= 0.0 {
            return Err(BondlabError::calculation(format!(
                "regular step must be positive, got {regular_step}"
            )));
        }
        let spacing = self.volatility * regular_step.sqrt();
        let mut tree = BinomialTree::new(times.to_vec(), spacing)?;

        // Arrow-Debreu prices at the current step.
        let mut prices = vec![1.0];

        for step in 0..tree.steps() {
            let h = tree.dt(step);
            let target = curve.discount_factor(tree.time_at_step(step + 1))?;

            let offset = |state: usize| (2.0 * state as f64 - step as f64) * spacing;
            let weighted: f64 = prices
                .iter()
                .enumerate()
                .map(|(state, q)| q * (-offset(state) * h).exp())
                .sum();
            let theta = (weighted / target).ln() / h;

            let mut next = vec![0.0; step + 2];
            for (state, q) in prices.iter().enumerate() {
                tree.set_rate(step, state, theta + offset(state));
                let discounted = q * tree.discount_factor(step, state, 0.0);
                next[state] += 0.5 * discounted;
                next[state + 1] += 0.5 * discounted;
            }
            prices = next;
        }

        debug!(
            "{} tree: {} steps, spacing {:.6}",
            self.name(),
            tree.steps(),
            spacing
        );
        Ok(tree)
    }
}
