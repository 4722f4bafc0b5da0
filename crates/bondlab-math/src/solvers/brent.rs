//! Brent's bracketing root finder.

use log::{debug, warn};

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Brent's method on the bracket `[a, b]`.
///
/// Requires `f(a)` and `f(b)` of opposite sign (or one of them zero).
/// Converges when the residual drops below `tolerance`. A bracket narrower
/// than `step_tolerance` with the residual still above `tolerance` (a jump
/// across zero) fails with [`MathError::ConvergenceFailed`].
///
/// # Example
///
/// ```rust
/// use bondlab_math::solvers::{brent, SolverConfig};
///
/// let f = |x: f64| x * x * x - x - 2.0;
/// let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!(f(result.root).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);

    if !fa.is_finite() || !fb.is_finite() {
        return Err(MathError::invalid_input("objective is not finite at the bracket"));
    }
    if fa == 0.0 {
        return Ok(SolverResult {
            root: a,
            iterations: 0,
            residual: 0.0,
        });
    }
    if fa * fb > 0.0 {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    // c is the contrapoint: f(b) and f(c) always straddle the root
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..config.max_iterations {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let half_width = 0.5 * (c - b);
        if fb.abs() < config.tolerance {
            debug!("brent converged in {iteration} iterations at x = {b}");
            return Ok(SolverResult {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }
        if half_width.abs() < config.step_tolerance {
            warn!("brent bracket collapsed at x = {b} with residual {fb:e}");
            return Err(MathError::convergence_failed(iteration, fb.abs()));
        }

        if e.abs() >= config.step_tolerance && fa.abs() > fb.abs() {
            // Attempt inverse quadratic interpolation (secant when a == c)
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * half_width * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * half_width * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * half_width * q - (config.step_tolerance * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = half_width;
                e = d;
            }
        } else {
            d = half_width;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > config.step_tolerance {
            d
        } else {
            config.step_tolerance.copysign(half_width)
        };
        fb = f(b);
        if !fb.is_finite() {
            return Err(MathError::invalid_input(format!(
                "objective is not finite at x = {b}"
            )));
        }
    }

    Err(MathError::convergence_failed(config.max_iterations, fb.abs()))
}
