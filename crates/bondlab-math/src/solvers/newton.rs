//! Newton-Raphson root finding.

use log::{debug, warn};

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Central-difference step for [`newton_raphson_numerical`].
const DERIVATIVE_STEP: f64 = 1e-7;

/// Newton-Raphson root finding: `x_{n+1} = x_n - f(x_n) / f'(x_n)`.
///
/// Fails with [`MathError::ConvergenceFailed`] once `max_iterations` is
/// exhausted or the step shrinks below `step_tolerance` while the residual
/// is still above `tolerance`, with [`MathError::DivisionByZero`] on a vanishing derivative,
/// and with [`MathError::InvalidInput`] if the objective leaves its domain
/// (returns a non-finite value).
///
/// # Example
///
/// ```rust
/// use bondlab_math::solvers::{newton_raphson, SolverConfig};
///
/// let config = SolverConfig::default();
/// let result = newton_raphson(|x| x * x - 2.0, |x| 2.0 * x, 1.5, &config).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton_raphson<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;
    let mut fx = f(x);

    for iteration in 0..config.max_iterations {
        if !fx.is_finite() {
            return Err(MathError::invalid_input(format!(
                "objective is not finite at x = {x}"
            )));
        }

        if fx.abs() < config.tolerance {
            debug!("newton converged in {iteration} iterations at x = {x}");
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        let dfx = df(x);
        if !dfx.is_finite() || dfx.abs() < 1e-15 {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;
        fx = f(x);

        if step.abs() < config.step_tolerance && fx.is_finite() {
            if fx.abs() < config.tolerance {
                debug!("newton converged in {} iterations at x = {x}", iteration + 1);
                return Ok(SolverResult {
                    root: x,
                    iterations: iteration + 1,
                    residual: fx,
                });
            }
            warn!(
                "newton stalled at x = {x} after {} iterations, residual {fx:e}",
                iteration + 1
            );
            return Err(MathError::convergence_failed(iteration + 1, fx.abs()));
        }
    }

    if fx.is_finite() && fx.abs() < config.tolerance {
        return Ok(SolverResult {
            root: x,
            iterations: config.max_iterations,
            residual: fx,
        });
    }

    Err(MathError::convergence_failed(config.max_iterations, fx.abs()))
}

/// Newton-Raphson with a central-difference derivative.
pub fn newton_raphson_numerical<F>(
    f: F,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let df =
        |x: f64| (f(x + DERIVATIVE_STEP) - f(x - DERIVATIVE_STEP)) / (2.0 * DERIVATIVE_STEP);
    newton_raphson(&f, df, initial_guess, config)
}
