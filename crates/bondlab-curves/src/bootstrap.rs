//! Sequential bootstrap.
//!
//! Instruments are solved in ascending maturity order. Each step finds the
//! zero rate at the instrument's maturity such that its discounted cash
//! flows reproduce its market (dirty) price, holding the earlier nodes
//! fixed:
//!
//! - flows before the first node see the first node's rate (flat)
//! - flows between known nodes see the linear interpolation between them
//! - flows after the last known node interpolate linearly towards the
//!   unknown node
//!
//! This is exactly how the resulting `Bootstrap` curve evaluates, so every
//! input instrument reprices to its market price.

use log::debug;

use bondlab_core::{BondlabError, BondlabResult};
use bondlab_math::solvers::{newton_raphson_numerical, SolverConfig};

use crate::curve::{discount_factor, CurveMethod, YieldCurve, YieldCurvePoint};

/// An instrument usable as a bootstrap pillar.
pub trait CurveInstrument: Send + Sync {
    /// Pillar maturity in years; the last cash flow time.
    fn maturity(&self) -> f64;

    /// Remaining cash flows as `(time in years, amount)`.
    fn cash_flows(&self) -> Vec<(f64, f64)>;

    /// Market dirty price (present value of the flows).
    fn market_price(&self) -> f64;

    /// Short description for diagnostics.
    fn description(&self) -> String {
        format!("instrument maturing at {:.4}y", self.maturity())
    }
}

/// A plain cash-flow instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowInstrument {
    flows: Vec<(f64, f64)>,
    price: f64,
}

impl CashFlowInstrument {
    /// Creates an instrument from `(time, amount)` flows and a dirty price.
    pub fn new(flows: Vec<(f64, f64)>, price: f64) -> BondlabResult<Self> {
        if flows.is_empty() {
            return Err(BondlabError::invalid_instrument("instrument has no cash flows"));
        }
        if flows
            .iter()
            .any(|(t, a)| !t.is_finite() || *t <= 0.0 || !a.is_finite())
        {
            return Err(BondlabError::invalid_instrument(
                "cash flows need positive times and finite amounts",
            ));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "market price must be positive, got {price}"
            )));
        }
        let mut flows = flows;
        flows.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { flows, price })
    }

    /// A zero-coupon instrument paying `amount` at `t`.
    pub fn zero(t: f64, amount: f64, price: f64) -> BondlabResult<Self> {
        Self::new(vec![(t, amount)], price)
    }
}

impl CurveInstrument for CashFlowInstrument {
    fn maturity(&self) -> f64 {
        self.flows.last().map_or(0.0, |(t, _)| *t)
    }

    fn cash_flows(&self) -> Vec<(f64, f64)> {
        self.flows.clone()
    }

    fn market_price(&self) -> f64 {
        self.price
    }
}

impl<T: CurveInstrument + ?Sized> CurveInstrument for Box<T> {
    fn maturity(&self) -> f64 {
        (**self).maturity()
    }

    fn cash_flows(&self) -> Vec<(f64, f64)> {
        (**self).cash_flows()
    }

    fn market_price(&self) -> f64 {
        (**self).market_price()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// Sequential bootstrapper.
///
/// ```rust
/// use bondlab_curves::bootstrap::{Bootstrapper, CashFlowInstrument};
///
/// let curve = Bootstrapper::new()
///     .add_instrument(CashFlowInstrument::zero(1.0, 100.0, 96.0).unwrap())
///     .add_instrument(CashFlowInstrument::new(vec![(1.0, 5.0), (2.0, 105.0)], 100.5).unwrap())
///     .bootstrap()
///     .unwrap();
///
/// assert_eq!(curve.len(), 2);
/// ```
pub struct Bootstrapper {
    instruments: Vec<Box<dyn CurveInstrument>>,
    config: SolverConfig,
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrapper {
    /// Creates an empty bootstrapper.
    pub fn new() -> Self {
        Self {
            instruments: Vec::new(),
            config: SolverConfig::default(),
        }
    }

    /// Sets the per-pillar solver configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an instrument.
    #[must_use]
    pub fn add_instrument(mut self, instrument: impl CurveInstrument + 'static) -> Self {
        self.instruments.push(Box::new(instrument));
        self
    }

    /// Adds several instruments.
    #[must_use]
    pub fn add_instruments<I, T>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: CurveInstrument + 'static,
    {
        for instrument in instruments {
            self.instruments.push(Box::new(instrument));
        }
        self
    }

    /// Builds the curve.
    pub fn bootstrap(&self) -> BondlabResult<YieldCurve> {
        bootstrap_with_config(&self.instruments, &self.config)
    }
}

/// Bootstraps a curve from instruments with default solver settings.
pub fn bootstrap<I: CurveInstrument>(instruments: &[I]) -> BondlabResult<YieldCurve> {
    bootstrap_with_config(instruments, &SolverConfig::default())
}

/// Bootstraps a curve from instruments.
///
/// Fails with `Calculation` on an empty set or duplicate maturities and
/// with `ConvergenceError` if a pillar cannot be solved.
pub fn bootstrap_with_config<I: CurveInstrument>(
    instruments: &[I],
    config: &SolverConfig,
) -> BondlabResult<YieldCurve> {
    if instruments.is_empty() {
        return Err(BondlabError::calculation("no instruments to bootstrap"));
    }

    let mut order: Vec<usize> = (0..instruments.len()).collect();
    order.sort_by(|&a, &b| instruments[a].maturity().total_cmp(&instruments[b].maturity()));

    let mut nodes: Vec<YieldCurvePoint> = Vec::with_capacity(instruments.len());

    for &index in &order {
        let instrument = &instruments[index];
        let maturity = instrument.maturity();
        let price = instrument.market_price();
        let flows = instrument.cash_flows();

        validate_instrument(instrument, maturity, price, &flows)?;
        if let Some(last) = nodes.last() {
            if maturity - last.maturity < 1e-10 {
                return Err(BondlabError::calculation(format!(
                    "duplicate bootstrap maturity {maturity:.6}y ({})",
                    instrument.description()
                )));
            }
        }

        let objective = |z: f64| -> f64 {
            flows
                .iter()
                .map(|&(t, amount)| {
                    let rate = rate_with_trial_node(&nodes, maturity, z, t);
                    discount_factor(rate, t).map_or(f64::NAN, |df| amount * df)
                })
                .sum::<f64>()
                - price
        };

        let guess = nodes.last().map_or(0.05, |n| n.rate);
        let solution = newton_raphson_numerical(objective, guess, config).map_err(|e| {
            debug!("bootstrap failed at {maturity:.4}y: {e}");
            BondlabError::from(e)
        })?;

        debug!(
            "bootstrapped {maturity:.4}y at {:.6} in {} iterations",
            solution.root, solution.iterations
        );
        nodes.push(YieldCurvePoint::new(maturity, solution.root));
    }

    YieldCurve::new(nodes, CurveMethod::Bootstrap)
}

fn validate_instrument<I: CurveInstrument>(
    instrument: &I,
    maturity: f64,
    price: f64,
    flows: &[(f64, f64)],
) -> BondlabResult<()> {
    if !maturity.is_finite() || maturity <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "bootstrap maturity must be positive ({})",
            instrument.description()
        )));
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "market price must be positive ({})",
            instrument.description()
        )));
    }
    if flows.is_empty() {
        return Err(BondlabError::invalid_instrument(format!(
            "no remaining cash flows ({})",
            instrument.description()
        )));
    }
    if flows.iter().any(|&(t, _)| t <= 0.0 || t > maturity + 1e-10) {
        return Err(BondlabError::invalid_instrument(format!(
            "cash flow times must lie in (0, maturity] ({})",
            instrument.description()
        )));
    }
    Ok(())
}

/// Zero rate at `t` with the known `nodes` plus a trial node `(maturity, z)`.
fn rate_with_trial_node(nodes: &[YieldCurvePoint], maturity: f64, z: f64, t: f64) -> f64 {
    let Some(last) = nodes.last() else {
        return z;
    };

    if t >= last.maturity {
        let weight = ((t - last.maturity) / (maturity - last.maturity)).min(1.0);
        return last.rate + weight * (z - last.rate);
    }
    if t <= nodes[0].maturity {
        return nodes[0].rate;
    }

    let upper = nodes.partition_point(|n| n.maturity <= t);
    let (lo, hi) = (nodes[upper - 1], nodes[upper]);
    lo.rate + (t - lo.maturity) / (hi.maturity - lo.maturity) * (hi.rate - lo.rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn price_on_curve(curve: &YieldCurve, flows: &[(f64, f64)]) -> f64 {
        flows
            .iter()
            .map(|&(t, a)| a * curve.discount_factor(t).unwrap())
            .sum()
    }

    #[test]
    fn test_zero_coupon_pillars_recover_rates() {
        let instruments = vec![
            CashFlowInstrument::zero(1.0, 100.0, 100.0 / 1.03).unwrap(),
            CashFlowInstrument::zero(2.0, 100.0, 100.0 / 1.035f64.powi(2)).unwrap(),
            CashFlowInstrument::zero(5.0, 100.0, 100.0 / 1.04f64.powi(5)).unwrap(),
        ];

        let curve = bootstrap(&instruments).unwrap();

        assert_eq!(curve.method(), CurveMethod::Bootstrap);
        assert_relative_eq!(curve.rate_at(1.0).unwrap(), 0.03, epsilon = 1e-10);
        assert_relative_eq!(curve.rate_at(2.0).unwrap(), 0.035, epsilon = 1e-10);
        assert_relative_eq!(curve.rate_at(5.0).unwrap(), 0.04, epsilon = 1e-10);
    }

    #[test]
    fn test_coupon_instruments_reprice() {
        let instruments = vec![
            CashFlowInstrument::new(vec![(0.5, 102.0)], 100.4).unwrap(),
            CashFlowInstrument::new(vec![(0.5, 2.25), (1.0, 2.25), (1.5, 102.25)], 100.9).unwrap(),
            CashFlowInstrument::new(
                (1..=6).map(|k| (f64::from(k) * 0.5, if k == 6 { 102.5 } else { 2.5 })).collect(),
                101.2,
            )
            .unwrap(),
        ];

        let curve = bootstrap(&instruments).unwrap();

        for instrument in &instruments {
            assert_relative_eq!(
                price_on_curve(&curve, &instrument.cash_flows()),
                instrument.market_price(),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let instruments = vec![
            CashFlowInstrument::zero(5.0, 100.0, 80.0).unwrap(),
            CashFlowInstrument::zero(1.0, 100.0, 97.0).unwrap(),
        ];
        let curve = bootstrap(&instruments).unwrap();
        assert_relative_eq!(curve.maturities()[0], 1.0);
    }

    #[test]
    fn test_duplicate_maturity_rejected() {
        let instruments = vec![
            CashFlowInstrument::zero(2.0, 100.0, 93.0).unwrap(),
            CashFlowInstrument::zero(2.0, 100.0, 93.5).unwrap(),
        ];
        assert!(matches!(
            bootstrap(&instruments),
            Err(BondlabError::Calculation { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let instruments: Vec<CashFlowInstrument> = Vec::new();
        assert!(bootstrap(&instruments).is_err());
    }

    #[test]
    fn test_builder_with_boxed_instruments() {
        let curve = Bootstrapper::new()
            .add_instruments(vec![
                CashFlowInstrument::zero(1.0, 100.0, 97.0).unwrap(),
                CashFlowInstrument::zero(3.0, 100.0, 90.0).unwrap(),
            ])
            .bootstrap()
            .unwrap();

        assert_relative_eq!(curve.discount_factor(3.0).unwrap(), 0.9, epsilon = 1e-10);
    }
}
