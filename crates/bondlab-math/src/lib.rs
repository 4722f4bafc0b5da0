//! # Bondlab Math
//!
//! Numerical primitives for the Bondlab fixed income analytics library.
//!
//! This crate provides:
//!
//! - **Solvers**: Root-finding algorithms (Newton-Raphson, Brent)
//! - **Interpolation**: Linear, natural cubic spline, and Nelson-Siegel/Svensson loadings
//! - **Linear Algebra**: Tridiagonal and dense linear systems
//! - **Optimization**: Levenberg-Marquardt nonlinear least squares
//!
//! ## Design Philosophy
//!
//! - **Plain `f64`**: Pricing kernels work in floating point; exact decimal
//!   arithmetic lives in the callers that need it
//! - **Explicit failure**: Every solver reports non-convergence as an error,
//!   never as a sentinel value

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        curvature_loading, slope_loading, CubicSpline, Extrapolation, Interpolator,
        LinearInterpolator,
    };
    pub use crate::optimization::{levenberg_marquardt, LeastSquaresConfig, LeastSquaresResult};
    pub use crate::solvers::{
        brent, newton_raphson, newton_raphson_numerical, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
