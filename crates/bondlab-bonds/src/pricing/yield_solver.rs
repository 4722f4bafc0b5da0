//! Yield solving.
//!
//! Newton-Raphson on `price(y) - target` with the analytic slope
//! `dP/dy = -Σ PV·t / (1 + y/m)`. Convergence is on the price residual
//! (`1e-6` by default) within 100 iterations; running out of iterations
//! surfaces as `ConvergenceError` with the count attached.
//!
//! Yields to exercise reuse the same solve on the flows up to the
//! exercise date, redeemed at the exercise price.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_math::solvers::{newton_raphson, SolverConfig};

use crate::bond::{Bond, ExerciseEntry};
use crate::cashflows::{discounting_flows_on, timed_flows_on, Timeline};
use crate::pricing::accrued::accrued_on;
use crate::pricing::value_and_slope;

/// Default price tolerance for yield solves.
pub const DEFAULT_PRICE_TOLERANCE: f64 = 1e-6;

/// Default iteration cap for yield solves.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Initial guess for zero coupons.
const ZERO_COUPON_GUESS: f64 = 0.05;

/// Result of a yield calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldResult {
    /// The yield as a decimal (0.05 = 5 %).
    pub yield_value: f64,
    /// Newton iterations used.
    pub iterations: u32,
    /// Final price residual.
    pub residual: f64,
}

/// Yield to worst with the workout it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldToWorst {
    /// Lowest yield across maturity and future calls.
    pub yield_value: f64,
    /// Workout date: a call date or maturity.
    pub workout_date: Date,
    /// Redemption amount at the workout date.
    pub workout_price: f64,
}

/// Price-to-yield solver.
///
/// ```rust
/// use bondlab_bonds::bond::{Bond, FixedRateBond};
/// use bondlab_bonds::pricing::{price_from_yield, YieldSolver};
/// use bondlab_core::daycounts::DayCountConvention;
/// use bondlab_core::types::{Date, Frequency};
///
/// let settlement = Date::from_ymd(2025, 3, 3).unwrap();
/// let bond: Bond = FixedRateBond::new(
///     100.0,
///     0.045,
///     Date::from_ymd(2032, 8, 15).unwrap(),
///     Frequency::SemiAnnual,
///     DayCountConvention::ActActIsda,
/// )
/// .unwrap()
/// .into();
///
/// let clean = price_from_yield(&bond, 0.0512, settlement).unwrap();
/// let result = YieldSolver::new().solve(&bond, clean, settlement).unwrap();
/// assert!((result.yield_value - 0.0512).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldSolver {
    config: SolverConfig,
    initial_guess: Option<f64>,
}

impl Default for YieldSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl YieldSolver {
    /// Creates a solver: tolerance 1e-6 on price, 100 iterations, guess
    /// from the coupon.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SolverConfig::new(DEFAULT_PRICE_TOLERANCE, DEFAULT_MAX_ITERATIONS),
            initial_guess: None,
        }
    }

    /// Replaces the solver configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the price tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config = self.config.with_tolerance(tolerance);
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config = self.config.with_max_iterations(max_iterations);
        self
    }

    /// Overrides the initial guess.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Solver configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Yield to maturity for a clean price.
    ///
    /// Callable and putable bonds are solved to maturity as if option-free.
    pub fn solve(
        &self,
        bond: &Bond,
        clean_price: f64,
        settlement: Date,
    ) -> BondlabResult<YieldResult> {
        validate_price(clean_price)?;
        let timeline = Timeline::new(bond, settlement)?;
        let flows: Vec<(f64, f64)> = discounting_flows_on(bond, &timeline)?
            .iter()
            .map(|f| (f.time, f.amount()))
            .collect();
        let accrued = accrued_on(bond, &timeline)?;

        self.solve_flows(bond, &flows, clean_price + accrued)
    }

    /// Yield to a given exercise: coupons up to the exercise date, then
    /// redemption at the exercise price.
    pub fn solve_to_exercise(
        &self,
        bond: &Bond,
        clean_price: f64,
        settlement: Date,
        entry: &ExerciseEntry,
    ) -> BondlabResult<YieldResult> {
        validate_price(clean_price)?;
        if entry.date <= settlement {
            return Err(BondlabError::invalid_instrument(format!(
                "exercise date {} is not after settlement {settlement}",
                entry.date
            )));
        }
        let timeline = Timeline::new(bond, settlement)?;

        let mut flows: Vec<(f64, f64)> = timed_flows_on(bond, &timeline)?
            .iter()
            .filter(|f| f.cash_flow.date <= entry.date)
            .map(|f| (f.time, f.cash_flow.interest))
            .collect();
        flows.push((timeline.time_of(entry.date)?, entry.price));

        let accrued = accrued_on(bond, &timeline)?;
        self.solve_flows(bond, &flows, clean_price + accrued)
    }

    fn solve_flows(
        &self,
        bond: &Bond,
        flows: &[(f64, f64)],
        target: f64,
    ) -> BondlabResult<YieldResult> {
        let m = bond.periods_per_year();
        let guess = self.initial_guess.unwrap_or_else(|| default_guess(bond));

        let result = newton_raphson(
            |y| value_and_slope(flows, y, m).0 - target,
            |y| value_and_slope(flows, y, m).1,
            guess,
            &self.config,
        )
        .map_err(|e| {
            warn!("{} bond yield solve failed from guess {guess}: {e}", bond.kind());
            BondlabError::from(e)
        })?;

        debug!(
            "{} bond yield {:.8} after {} iterations",
            bond.kind(),
            result.root,
            result.iterations
        );

        Ok(YieldResult {
            yield_value: result.root,
            iterations: result.iterations,
            residual: result.residual,
        })
    }
}

/// Yield to maturity for a clean price with default solver settings.
pub fn yield_from_price(bond: &Bond, clean_price: f64, settlement: Date) -> BondlabResult<f64> {
    Ok(YieldSolver::new().solve(bond, clean_price, settlement)?.yield_value)
}

/// Yield to a specific exercise entry.
pub fn yield_to_exercise(
    bond: &Bond,
    clean_price: f64,
    settlement: Date,
    entry: &ExerciseEntry,
) -> BondlabResult<f64> {
    Ok(YieldSolver::new()
        .solve_to_exercise(bond, clean_price, settlement, entry)?
        .yield_value)
}

/// Yield to the first call after settlement.
pub fn yield_to_call(bond: &Bond, clean_price: f64, settlement: Date) -> BondlabResult<f64> {
    let Bond::Callable(callable) = bond else {
        return Err(BondlabError::invalid_instrument(format!(
            "{} bond has no call schedule",
            bond.kind()
        )));
    };
    let entry = first_future(callable.future_entries(settlement), "call")?;
    yield_to_exercise(bond, clean_price, settlement, entry)
}

/// Yield to the first put after settlement.
pub fn yield_to_put(bond: &Bond, clean_price: f64, settlement: Date) -> BondlabResult<f64> {
    let Bond::Putable(putable) = bond else {
        return Err(BondlabError::invalid_instrument(format!(
            "{} bond has no put schedule",
            bond.kind()
        )));
    };
    let entry = first_future(putable.future_entries(settlement), "put")?;
    yield_to_exercise(bond, clean_price, settlement, entry)
}

/// Lowest yield over maturity and every future call.
///
/// Only callable bonds have alternative workouts; for every other bond,
/// putables included, this is the yield to maturity.
pub fn yield_to_worst(
    bond: &Bond,
    clean_price: f64,
    settlement: Date,
) -> BondlabResult<YieldToWorst> {
    let solver = YieldSolver::new();
    let mut worst = YieldToWorst {
        yield_value: solver.solve(bond, clean_price, settlement)?.yield_value,
        workout_date: bond.maturity(),
        workout_price: bond.face_value(),
    };

    if let Bond::Callable(callable) = bond {
        for entry in callable.future_entries(settlement) {
            let y = solver
                .solve_to_exercise(bond, clean_price, settlement, entry)?
                .yield_value;
            if y < worst.yield_value {
                worst = YieldToWorst {
                    yield_value: y,
                    workout_date: entry.date,
                    workout_price: entry.price,
                };
            }
        }
    }

    Ok(worst)
}

fn first_future<'a>(
    mut entries: impl Iterator<Item = &'a ExerciseEntry>,
    what: &str,
) -> BondlabResult<&'a ExerciseEntry> {
    entries
        .next()
        .ok_or_else(|| BondlabError::invalid_instrument(format!("no {what} date after settlement")))
}

fn default_guess(bond: &Bond) -> f64 {
    match bond {
        Bond::ZeroCoupon(_) => ZERO_COUPON_GUESS,
        _ => bond.coupon_rate(),
    }
}

fn validate_price(clean_price: f64) -> BondlabResult<()> {
    if !clean_price.is_finite() || clean_price <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "clean price must be positive and finite, got {clean_price}"
        )));
    }
    Ok(())
}
