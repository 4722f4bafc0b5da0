//! # Bondlab Curves
//!
//! Zero-coupon yield curves for bond valuation.
//!
//! - [`YieldCurve`]: immutable term structure of annually compounded zero
//!   rates, evaluated by linear or natural cubic spline interpolation, or by
//!   a fitted Nelson-Siegel/Svensson model
//! - [`bootstrap`]: sequential bootstrap from priced instruments
//! - [`parametric`]: Nelson-Siegel and Svensson least-squares fitting
//! - [`forward`]: forward rates between spot points and the inverse
//!
//! Rates are decimals (`0.05` is 5 %) and maturities are in years.
//! Discount factors are `(1 + z(t))^(-t)`.
//!
//! ## Example
//!
//! ```rust
//! use bondlab_curves::prelude::*;
//!
//! let curve = YieldCurve::new(
//!     vec![
//!         YieldCurvePoint::new(1.0, 0.040),
//!         YieldCurvePoint::new(5.0, 0.045),
//!         YieldCurvePoint::new(10.0, 0.050),
//!     ],
//!     CurveMethod::Linear,
//! )
//! .unwrap();
//!
//! assert!((curve.rate_at(3.0).unwrap() - 0.0425).abs() < 1e-12);
//! let shifted = curve.with_parallel_shift(0.0001);
//! assert!(shifted.rate_at(3.0).unwrap() > curve.rate_at(3.0).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]

pub mod bootstrap;
pub mod curve;
pub mod forward;
pub mod parametric;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{Bootstrapper, CashFlowInstrument, CurveInstrument};
    pub use crate::curve::{CurveMethod, YieldCurve, YieldCurvePoint};
    pub use crate::forward::{forward_rate, spot_from_forwards, ForwardSegment};
    pub use crate::parametric::{
        fit_nelson_siegel, fit_svensson, NelsonSiegelParameters, SvenssonParameters,
    };
}

pub use curve::{CurveMethod, YieldCurve, YieldCurvePoint};
