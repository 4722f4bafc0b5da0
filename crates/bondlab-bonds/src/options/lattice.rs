//! Lattice pricing of bonds with embedded options.
//!
//! The time grid has a node at every cash flow. Each interval between
//! flows is cut into steps no longer than `1 / (m · steps_per_period)`, so
//! full coupon periods get exactly `steps_per_period` steps and the stub
//! to the next coupon gets proportionally fewer.
//!
//! Rolling back, a callable node is worth `min(continuation, call price)`
//! and a putable node `max(continuation, put price)`, from the first
//! exercise date on. The price in force is the latest schedule entry on
//! or before the node time. Coupons paid at a node are added after the
//! exercise decision.

use log::debug;
use serde::{Deserialize, Serialize};

use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::YieldCurve;

use super::{BinomialTree, HoLee, ShortRateModel};
use crate::bond::{Bond, EmbeddedOptionBond};
use crate::cashflows::{discounting_flows_on, TimedCashFlow, Timeline};
use crate::pricing::accrued::accrued_on;

/// Default steps per coupon period.
pub const DEFAULT_STEPS_PER_PERIOD: usize = 4;

const TIME_EPSILON: f64 = 1e-10;

/// Result of a lattice valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeValuation {
    /// Dirty price including the embedded option.
    pub dirty_price: f64,
    /// Clean price including the embedded option.
    pub clean_price: f64,
    /// Accrued interest.
    pub accrued: f64,
    /// Dirty price of the same flows without exercise.
    pub option_free_dirty: f64,
    /// Value of the embedded option to its owner (issuer for calls,
    /// holder for puts); zero for option-free bonds.
    pub option_value: f64,
}

/// Prices bonds on a calibrated short-rate tree.
///
/// ```rust
/// use bondlab_bonds::bond::{Bond, ExerciseEntry, FixedRateBond};
/// use bondlab_bonds::options::{HoLee, LatticePricer};
/// use bondlab_core::daycounts::DayCountConvention;
/// use bondlab_core::types::{Date, Frequency};
/// use bondlab_curves::{CurveMethod, YieldCurve, YieldCurvePoint};
///
/// let curve = YieldCurve::new(
///     vec![YieldCurvePoint::new(1.0, 0.04), YieldCurvePoint::new(10.0, 0.045)],
///     CurveMethod::Linear,
/// )
/// .unwrap();
/// let base = FixedRateBond::new(
///     100.0,
///     0.05,
///     Date::from_ymd(2035, 1, 15).unwrap(),
///     Frequency::SemiAnnual,
///     DayCountConvention::Thirty360,
/// )
/// .unwrap();
/// let bond = Bond::callable(
///     base,
///     vec![ExerciseEntry::new(Date::from_ymd(2028, 1, 15).unwrap(), 100.0)],
/// )
/// .unwrap();
///
/// let pricer = LatticePricer::new(HoLee::new(0.01).unwrap(), 4).unwrap();
/// let value = pricer.price(&bond, &curve, Date::from_ymd(2025, 1, 15).unwrap()).unwrap();
/// assert!(value.option_value > 0.0);
/// assert!(value.dirty_price < value.option_free_dirty);
/// ```
#[derive(Debug, Clone)]
pub struct LatticePricer<M: ShortRateModel = HoLee> {
    model: M,
    steps_per_period: usize,
}

impl<M: ShortRateModel> LatticePricer<M> {
    /// Creates a pricer; `steps_per_period` must be at least 1.
    pub fn new(model: M, steps_per_period: usize) -> BondlabResult<Self> {
        if steps_per_period == 0 {
            return Err(BondlabError::invalid_instrument(
                "lattice needs at least one step per period",
            ));
        }
        Ok(Self {
            model,
            steps_per_period,
        })
    }

    /// The short-rate model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Steps per coupon period.
    pub fn steps_per_period(&self) -> usize {
        self.steps_per_period
    }

    /// Values `bond` on a tree calibrated to `curve`.
    pub fn price(
        &self,
        bond: &Bond,
        curve: &YieldCurve,
        settlement: Date,
    ) -> BondlabResult<LatticeValuation> {
        let timeline = Timeline::new(bond, settlement)?;
        let flows = discounting_flows_on(bond, &timeline)?;
        let regular_step = 1.0 / (bond.periods_per_year() * self.steps_per_period as f64);

        let grid = build_grid(&flows, regular_step)?;
        let tree = self.model.build_tree(curve, &grid.times, regular_step)?;

        let strikes = match bond {
            Bond::Callable(embedded) | Bond::Putable(embedded) => {
                exercise_prices(embedded, &timeline, &grid.times)?
            }
            _ => vec![None; grid.times.len()],
        };

        let straight = roll_back(&tree, &grid, |_, continuation| continuation);
        let dirty = match bond {
            Bond::Callable(_) => roll_back(&tree, &grid, |step, continuation| {
                strikes[step].map_or(continuation, |strike| continuation.min(strike))
            }),
            Bond::Putable(_) => roll_back(&tree, &grid, |step, continuation| {
                strikes[step].map_or(continuation, |strike| continuation.max(strike))
            }),
            _ => straight,
        };

        let option_value = match bond {
            Bond::Callable(_) => straight - dirty,
            Bond::Putable(_) => dirty - straight,
            _ => 0.0,
        };
        let accrued = accrued_on(bond, &timeline)?;

        debug!(
            "{} lattice ({}, {} steps): dirty {dirty:.6}, option {option_value:.6}",
            bond.kind(),
            self.model.name(),
            tree.steps()
        );

        Ok(LatticeValuation {
            dirty_price: dirty,
            clean_price: dirty - accrued,
            accrued,
            option_free_dirty: straight,
            option_value,
        })
    }

    /// Values `bond` with the curve moved in parallel by `shift`; the tree
    /// is recalibrated to the shifted curve.
    pub fn price_with_shift(
        &self,
        bond: &Bond,
        curve: &YieldCurve,
        settlement: Date,
        shift: f64,
    ) -> BondlabResult<LatticeValuation> {
        self.price(bond, &curve.with_parallel_shift(shift), settlement)
    }
}

impl LatticePricer<HoLee> {
    /// Ho-Lee pricer with the default step count.
    pub fn ho_lee(volatility: f64) -> BondlabResult<Self> {
        Self::new(HoLee::new(volatility)?, DEFAULT_STEPS_PER_PERIOD)
    }
}

struct Grid {
    times: Vec<f64>,
    /// Amount paid at each node.
    payments: Vec<f64>,
}

fn build_grid(flows: &[TimedCashFlow], regular_step: f64) -> BondlabResult<Grid> {
    let mut times = vec![0.0];
    let mut payments = vec![0.0];

    for flow in flows {
        let last = times[times.len() - 1];
        let gap = flow.time - last;
        if gap < -TIME_EPSILON {
            return Err(BondlabError::calculation("cash flows are not in time order"));
        }
        if gap <= TIME_EPSILON {
            let index = payments.len() - 1;
            payments[index] += flow.amount();
            continue;
        }

        let steps = ((gap / regular_step) - 1e-9).ceil().max(1.0) as usize;
        for k in 1..=steps {
            times.push(last + gap * k as f64 / steps as f64);
            payments.push(0.0);
        }
        let index = payments.len() - 1;
        times[index] = flow.time;
        payments[index] += flow.amount();
    }

    if times.len() < 2 {
        return Err(BondlabError::calculation("no cash flows after settlement"));
    }
    Ok(Grid { times, payments })
}

fn roll_back<F>(tree: &BinomialTree, grid: &Grid, exercise: F) -> f64
where
    F: Fn(usize, f64) -> f64,
{
    let last = grid.payments.len() - 1;
    tree.backward_induction(grid.payments[last], 0.0, |step, _, continuation| {
        let value = if step == 0 {
            continuation
        } else {
            exercise(step, continuation)
        };
        value + grid.payments[step]
    })
}

/// Exercise price in force at each node, `None` before the first entry,
/// at the root and at maturity.
fn exercise_prices(
    embedded: &EmbeddedOptionBond,
    timeline: &Timeline,
    times: &[f64],
) -> BondlabResult<Vec<Option<f64>>> {
    let settlement = timeline.settlement();
    let entries: Vec<(f64, f64)> = embedded
        .schedule()
        .iter()
        .map(|e| {
            let t = if e.date <= settlement {
                0.0
            } else {
                timeline.time_of(e.date)?
            };
            Ok((t, e.price))
        })
        .collect::<BondlabResult<_>>()?;

    let last = times.len() - 1;
    Ok(times
        .iter()
        .enumerate()
        .map(|(step, &t)| {
            if step == 0 || step == last {
                return None;
            }
            entries
                .iter()
                .take_while(|(te, _)| *te <= t + TIME_EPSILON)
                .last()
                .map(|(_, price)| *price)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{ExerciseEntry, FixedRateBond, ZeroCouponBond};
    use crate::pricing::price_from_curve;
    use approx::assert_relative_eq;
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;
    use bondlab_curves::{CurveMethod, YieldCurvePoint};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn curve() -> YieldCurve {
        YieldCurve::new(
            vec![
                YieldCurvePoint::new(0.5, 0.038),
                YieldCurvePoint::new(2.0, 0.040),
                YieldCurvePoint::new(5.0, 0.043),
                YieldCurvePoint::new(10.0, 0.047),
            ],
            CurveMethod::Linear,
        )
        .unwrap()
    }

    fn base() -> FixedRateBond {
        FixedRateBond::new(
            100.0,
            0.05,
            date(2035, 3, 1),
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
    }

    fn schedule() -> Vec<ExerciseEntry> {
        vec![
            ExerciseEntry::new(date(2028, 3, 1), 102.0),
            ExerciseEntry::new(date(2030, 3, 1), 100.0),
        ]
    }

    #[test]
    fn test_option_free_matches_curve_price() {
        let settlement = date(2025, 5, 12);
        let bond = Bond::from(base());
        let pricer = LatticePricer::ho_lee(0.012).unwrap();

        let lattice = pricer.price(&bond, &curve(), settlement).unwrap();
        let discounted = price_from_curve(&bond, &curve(), settlement).unwrap();

        assert_relative_eq!(lattice.dirty_price, discounted.dirty, epsilon = 1e-9);
        assert_relative_eq!(lattice.clean_price, discounted.clean, epsilon = 1e-9);
        assert_eq!(lattice.option_value, 0.0);
    }

    #[test]
    fn test_zero_coupon_on_lattice() {
        let settlement = date(2025, 1, 15);
        let bond: Bond =
            ZeroCouponBond::new(100.0, date(2031, 7, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into();
        let lattice =
            LatticePricer::ho_lee(0.01).unwrap().price(&bond, &curve(), settlement).unwrap();
        let discounted = price_from_curve(&bond, &curve(), settlement).unwrap();
        assert_relative_eq!(lattice.dirty_price, discounted.dirty, epsilon = 1e-9);
    }

    #[test]
    fn test_callable_worth_less_than_straight() {
        let settlement = date(2025, 5, 12);
        let bond = Bond::callable(base(), schedule()).unwrap();
        let value =
            LatticePricer::ho_lee(0.01).unwrap().price(&bond, &curve(), settlement).unwrap();

        assert!(value.option_value > 0.0);
        assert_relative_eq!(
            value.dirty_price + value.option_value,
            value.option_free_dirty,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_putable_worth_more_than_straight() {
        let settlement = date(2025, 5, 12);
        let bond = Bond::putable(base(), schedule()).unwrap();
        let value =
            LatticePricer::ho_lee(0.01).unwrap().price(&bond, &curve(), settlement).unwrap();

        assert!(value.option_value > 0.0);
        assert!(value.dirty_price > value.option_free_dirty);
    }

    #[test]
    fn test_call_value_rises_with_volatility() {
        let settlement = date(2025, 5, 12);
        let bond = Bond::callable(base(), schedule()).unwrap();

        let low =
            LatticePricer::ho_lee(0.005).unwrap().price(&bond, &curve(), settlement).unwrap();
        let high =
            LatticePricer::ho_lee(0.015).unwrap().price(&bond, &curve(), settlement).unwrap();
        assert!(high.option_value > low.option_value);
        assert!(high.dirty_price < low.dirty_price);
    }

    #[test]
    fn test_shift_lowers_price() {
        let settlement = date(2025, 5, 12);
        let bond = Bond::callable(base(), schedule()).unwrap();
        let pricer = LatticePricer::ho_lee(0.01).unwrap();

        let base_value = pricer.price(&bond, &curve(), settlement).unwrap();
        let shifted = pricer.price_with_shift(&bond, &curve(), settlement, 0.005).unwrap();
        assert!(shifted.dirty_price < base_value.dirty_price);
    }

    #[test]
    fn test_grid_aligns_with_coupons() {
        let flows: Vec<TimedCashFlow> = [0.3, 0.8, 1.3]
            .iter()
            .map(|&t| TimedCashFlow {
                cash_flow: bondlab_core::types::CashFlow::coupon(date(2030, 1, 1), 1.0),
                time: t,
            })
            .collect();
        let grid = build_grid(&flows, 0.125).unwrap();

        // 0.3 needs 3 steps, each later half-year period exactly 4.
        assert_eq!(grid.times.len(), 1 + 3 + 4 + 4);
        assert_relative_eq!(grid.times[3], 0.3);
        assert_relative_eq!(grid.times[7], 0.8);
        assert_relative_eq!(grid.times[11], 1.3);
        assert_relative_eq!(grid.payments.iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_rejects_zero_steps() {
        assert!(LatticePricer::new(HoLee::new(0.01).unwrap(), 0).is_err());
    }
}
