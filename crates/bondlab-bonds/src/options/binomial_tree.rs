//! Recombining binomial short-rate tree.

use bondlab_core::{BondlabError, BondlabResult};

/// A recombining binomial tree of short rates on a (possibly uneven) time
/// grid.
///
/// Step `i` has `i + 1` states. An up move from `(i, j)` lands on
/// `(i + 1, j + 1)`, a down move on `(i + 1, j)`, each with probability ½.
///
/// ```text
///                    [2,2]
///             [1,1] <
///     [0,0] <        [2,1]
///             [1,0] <
///                    [2,0]
/// ```
///
/// Rates are continuously compounded; a node discounts over its own step
/// with `exp(-(r + spread)·dt)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinomialTree {
    /// Node times in years; `times[0] = 0`.
    times: Vec<f64>,
    /// `rates[i][j]` for steps `0..steps`.
    rates: Vec<Vec<f64>>,
    /// Rate distance between neighbouring states.
    spacing: f64,
}

impl BinomialTree {
    /// Creates a tree with all rates zero.
    ///
    /// `times` must start at 0 and increase strictly, with at least one
    /// step.
    pub fn new(times: Vec<f64>, spacing: f64) -> BondlabResult<Self> {
        if times.len() < 2 || times[0] != 0.0 {
            return Err(BondlabError::calculation(
                "tree needs a time grid starting at 0 with at least one step",
            ));
        }
        if times.windows(2).any(|w| !(w[1] > w[0]) || !w[1].is_finite()) {
            return Err(BondlabError::calculation("tree times must increase strictly"));
        }
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(BondlabError::calculation(format!(
                "state spacing must be non-negative, got {spacing}"
            )));
        }

        let rates = (0..times.len() - 1).map(|i| vec![0.0; i + 1]).collect();
        Ok(Self {
            times,
            rates,
            spacing,
        })
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.rates.len()
    }

    /// Node times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Time in years at `step`.
    pub fn time_at_step(&self, step: usize) -> f64 {
        self.times[step]
    }

    /// Length of `step` in years.
    pub fn dt(&self, step: usize) -> f64 {
        self.times[step + 1] - self.times[step]
    }

    /// Rate distance between neighbouring states.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// States at `step`: always `step + 1`.
    pub fn states_at(&self, step: usize) -> usize {
        step + 1
    }

    /// Short rate at a node.
    pub fn rate_at(&self, step: usize, state: usize) -> f64 {
        self.rates[step][state]
    }

    /// Sets the short rate at a node.
    pub fn set_rate(&mut self, step: usize, state: usize, rate: f64) {
        self.rates[step][state] = rate;
    }

    /// One-step discount factor at a node with an added spread.
    pub fn discount_factor(&self, step: usize, state: usize, spread: f64) -> f64 {
        (-(self.rates[step][state] + spread) * self.dt(step)).exp()
    }

    /// Rolls `terminal` (the value in every final state) back to the root.
    ///
    /// At each earlier node, `node(step, state, continuation)` turns the
    /// discounted expected value into the node value; that is where
    /// exercise decisions and intermediate cash flows go.
    pub fn backward_induction<F>(&self, terminal: f64, spread: f64, mut node: F) -> f64
    where
        F: FnMut(usize, usize, f64) -> f64,
    {
        let steps = self.steps();
        let mut values = vec![terminal; steps + 1];

        for step in (0..steps).rev() {
            let next: Vec<f64> = (0..=step)
                .map(|state| {
                    let expected = 0.5 * (values[state + 1] + values[state]);
                    let continuation = self.discount_factor(step, state, spread) * expected;
                    node(step, state, continuation)
                })
                .collect();
            values = next;
        }

        values[0]
    }
}
