//! Root-finding algorithms.
//!
//! - [`newton_raphson`]: quadratic convergence when a derivative is available
//! - [`newton_raphson_numerical`]: Newton with a central-difference derivative
//! - [`brent`]: bracketing method combining bisection, secant and inverse
//!   quadratic interpolation; used where the objective has kinks (lattice
//!   prices with exercise boundaries)
//!
//! # Example: yield of an annual-pay bond
//!
//! ```rust
//! use bondlab_math::solvers::{newton_raphson, SolverConfig};
//!
//! // 5% coupon, 5 years, price 95
//! let price = |y: f64| {
//!     (1..=5).map(|t| 5.0 / (1.0 + y).powi(t)).sum::<f64>() + 100.0 / (1.0 + y).powi(5)
//! };
//! let dprice = |y: f64| {
//!     (1..=5).map(|t| -f64::from(t) * 5.0 / (1.0 + y).powi(t + 1)).sum::<f64>()
//!         - 500.0 / (1.0 + y).powi(6)
//! };
//!
//! let config = SolverConfig::default();
//! let result = newton_raphson(|y| price(y) - 95.0, dprice, 0.05, &config).unwrap();
//! assert!(result.root > 0.05);
//! ```

mod brent;
mod newton;

pub use brent::brent;
pub use newton::{newton_raphson, newton_raphson_numerical};

use serde::{Deserialize, Serialize};

/// Default residual tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default tolerance on the step size.
pub const DEFAULT_STEP_TOLERANCE: f64 = 1e-14;

/// Configuration for root-finding algorithms.
///
/// A solve converges only when `|f(x)| < tolerance`. A step smaller than
/// `step_tolerance` stops the iteration; with the residual still above
/// `tolerance` that is reported as a convergence failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Tolerance on the absolute residual.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Maximum number of iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Tolerance on the step size.
    #[serde(default = "default_step_tolerance")]
    pub step_tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_step_tolerance() -> f64 {
    DEFAULT_STEP_TOLERANCE
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_tolerance: DEFAULT_STEP_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
            step_tolerance: DEFAULT_STEP_TOLERANCE,
        }
    }

    /// Sets the residual tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the step tolerance.
    #[must_use]
    pub fn with_step_tolerance(mut self, step_tolerance: f64) -> Self {
        self.step_tolerance = step_tolerance;
        self
    }
}

/// Result of a successful root-finding run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Function value at the root.
    pub residual: f64,
}
