//! Error types for Bondlab.
//!
//! Every fallible operation in the workspace returns [`BondlabResult`]. The
//! taxonomy is closed:
//!
//! - [`BondlabError::InvalidInstrument`]: malformed input, fix the request
//! - [`BondlabError::ConvergenceError`]: an iterative solve ran out of
//!   iterations; retry with a different initial guess or a looser tolerance
//! - [`BondlabError::Calculation`]: any other numerical failure

use bondlab_math::MathError;
use thiserror::Error;

/// A specialized Result type for Bondlab operations.
pub type BondlabResult<T> = Result<T, BondlabError>;

/// The error type for Bondlab operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BondlabError {
    /// An instrument, curve or input violates its invariants.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// Description of the violated invariant.
        reason: String,
    },

    /// An iterative solver failed to converge.
    #[error("Failed to converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceError {
        /// Number of iterations attempted.
        iterations: u32,
        /// Absolute residual when the solver gave up.
        residual: f64,
    },

    /// A numerical computation failed for another reason.
    #[error("Calculation error: {message}")]
    Calculation {
        /// Description of the failure.
        message: String,
    },
}

impl BondlabError {
    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }

    /// Creates a convergence error.
    #[must_use]
    pub fn convergence(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceError {
            iterations,
            residual,
        }
    }

    /// Creates a calculation error.
    #[must_use]
    pub fn calculation(message: impl Into<String>) -> Self {
        Self::Calculation {
            message: message.into(),
        }
    }

    /// Returns true if retrying with different solver settings may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConvergenceError { .. })
    }

    /// Iteration count carried by a convergence failure.
    #[must_use]
    pub fn iterations(&self) -> Option<u32> {
        match self {
            Self::ConvergenceError { iterations, .. } => Some(*iterations),
            _ => None,
        }
    }
}

impl From<MathError> for BondlabError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ConvergenceFailed {
                iterations,
                residual,
            } => Self::ConvergenceError {
                iterations,
                residual,
            },
            other => Self::Calculation {
                message: other.to_string(),
            },
        }
    }
}

/// Validates that a numeric input is finite.
pub fn ensure_finite(name: &str, value: f64) -> BondlabResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BondlabError::invalid_instrument(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Validates that a numeric input is finite and strictly positive.
pub fn ensure_positive(name: &str, value: f64) -> BondlabResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BondlabError::invalid_instrument(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
