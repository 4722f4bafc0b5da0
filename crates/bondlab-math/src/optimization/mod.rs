//! Nonlinear least squares.
//!
//! [`levenberg_marquardt`] minimizes `Σ rᵢ(p)²` for a residual vector
//! function, with a central-difference Jacobian and multiplicative damping:
//! successful steps shrink the damping factor, rejected steps grow it.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};
use crate::linear_algebra::solve_linear_system;

/// Configuration for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeastSquaresConfig {
    /// Relative change in the sum of squares that counts as converged.
    pub tolerance: f64,
    /// Maximum number of outer iterations.
    pub max_iterations: u32,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Multiplier applied to the damping factor on rejection (divisor on acceptance).
    pub lambda_factor: f64,
    /// Upper bound on the damping factor.
    pub max_lambda: f64,
    /// Finite-difference step for the Jacobian.
    pub jacobian_step: f64,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_factor: 10.0,
            max_lambda: 1e10,
            jacobian_step: 1e-7,
        }
    }
}

impl LeastSquaresConfig {
    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Outcome of a least-squares run.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresResult {
    /// Parameters at the minimum found.
    pub parameters: Vec<f64>,
    /// Sum of squared residuals at `parameters`.
    pub sum_of_squares: f64,
    /// Outer iterations used.
    pub iterations: u32,
    /// Whether a convergence criterion was met.
    pub converged: bool,
}

fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// Levenberg-Marquardt minimization of `Σ residuals(p)²` from `initial`.
///
/// Residual evaluations returning non-finite values are treated as failed
/// steps. The result reports `converged = false` when the iteration budget
/// runs out first; callers decide whether that is fatal.
pub fn levenberg_marquardt<F>(
    residuals: F,
    initial: &[f64],
    config: &LeastSquaresConfig,
) -> MathResult<LeastSquaresResult>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::invalid_input("no parameters to fit"));
    }

    let mut params = initial.to_vec();
    let mut r = residuals(&params);
    let m = r.len();
    if m < n {
        return Err(MathError::insufficient_data(n, m));
    }
    if r.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("residuals not finite at initial point"));
    }

    let mut sse = sum_of_squares(&r);
    let mut lambda = config.initial_lambda;

    for iteration in 0..config.max_iterations {
        if sse < 1e-30 {
            return Ok(LeastSquaresResult {
                parameters: params,
                sum_of_squares: sse,
                iterations: iteration,
                converged: true,
            });
        }

        let jacobian = numerical_jacobian(&residuals, &params, m, config.jacobian_step);
        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let gradient = &jt * DVector::from_column_slice(&r);

        let mut damped = jtj.clone();
        for i in 0..n {
            damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
        }

        let step = match solve_linear_system(&damped, &(-&gradient)) {
            Ok(step) => step,
            Err(MathError::SingularMatrix) => {
                lambda *= config.lambda_factor;
                if lambda > config.max_lambda {
                    break;
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        let candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(p, s)| p + s).collect();
        let candidate_r = residuals(&candidate);
        let candidate_sse = if candidate_r.iter().all(|v| v.is_finite()) {
            sum_of_squares(&candidate_r)
        } else {
            f64::INFINITY
        };

        if candidate_sse < sse {
            let improvement = (sse - candidate_sse) / sse;
            params = candidate;
            r = candidate_r;
            sse = candidate_sse;
            lambda = (lambda / config.lambda_factor).max(1e-12);

            let step_norm = step.norm();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
            if improvement < config.tolerance || step_norm < 1e-12 * (param_norm + 1e-12) {
                debug!(
                    "levenberg-marquardt converged in {} iterations, sse = {sse:.3e}",
                    iteration + 1
                );
                return Ok(LeastSquaresResult {
                    parameters: params,
                    sum_of_squares: sse,
                    iterations: iteration + 1,
                    converged: true,
                });
            }
        } else {
            lambda *= config.lambda_factor;
            if lambda > config.max_lambda {
                // No descent direction left at any damping: a stationary point
                debug!("levenberg-marquardt stationary after {} iterations", iteration + 1);
                return Ok(LeastSquaresResult {
                    parameters: params,
                    sum_of_squares: sse,
                    iterations: iteration + 1,
                    converged: true,
                });
            }
        }
    }

    Ok(LeastSquaresResult {
        parameters: params,
        sum_of_squares: sse,
        iterations: config.max_iterations,
        converged: false,
    })
}

fn numerical_jacobian<F>(residuals: &F, params: &[f64], m: usize, h: f64) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = params.len();
    let mut jacobian = DMatrix::zeros(m, n);
    let mut bumped = params.to_vec();

    for j in 0..n {
        let step = h * params[j].abs().max(1.0);
        bumped[j] = params[j] + step;
        let up = residuals(&bumped);
        bumped[j] = params[j] - step;
        let down = residuals(&bumped);
        bumped[j] = params[j];

        for i in 0..m {
            let derivative = (up[i] - down[i]) / (2.0 * step);
            jacobian[(i, j)] = if derivative.is_finite() { derivative } else { 0.0 };
        }
    }

    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_decay_fit() {
        // y = 2 e^(-0.5 x), sampled without noise
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * (-0.5 * x).exp()).collect();

        let residuals = |p: &[f64]| -> Vec<f64> {
            xs.iter()
                .zip(ys.iter())
                .map(|(x, y)| p[0] * (-p[1] * x).exp() - y)
                .collect()
        };

        let result =
            levenberg_marquardt(residuals, &[1.0, 0.1], &LeastSquaresConfig::default()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.parameters[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.parameters[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_rosenbrock_as_residuals() {
        let residuals = |p: &[f64]| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]];

        let config = LeastSquaresConfig::default().with_max_iterations(500);
        let result = levenberg_marquardt(residuals, &[-1.2, 1.0], &config).unwrap();

        assert_relative_eq!(result.parameters[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.parameters[1], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_underdetermined_rejected() {
        let result = levenberg_marquardt(
            |p: &[f64]| vec![p[0] + p[1]],
            &[0.0, 0.0],
            &LeastSquaresConfig::default(),
        );

        assert!(matches!(result, Err(MathError::InsufficientData { .. })));
    }
}
