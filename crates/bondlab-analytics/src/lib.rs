//! # Bondlab Analytics
//!
//! Curve-relative and structured-product analytics on top of
//! `bondlab-bonds`:
//!
//! - **Spreads**: Z-spread and lattice OAS ([`spreads`])
//! - **Credit**: hazard rates, default probabilities and spread
//!   decomposition ([`credit`])
//! - **Structured**: PSA prepayment, mortgage pool WAL and ABS waterfalls
//!   ([`structured`])
//! - **Batch**: parallel pricing across a portfolio ([`batch`])
//! - **Configuration**: TOML-loadable solver, lattice and bump settings
//!   ([`config`]) applied by [`BondAnalyzer`]
//!
//! ## Example
//!
//! ```rust
//! use bondlab_analytics::prelude::*;
//! use bondlab_bonds::bond::{Bond, FixedRateBond};
//! use bondlab_core::prelude::*;
//! use bondlab_curves::{CurveMethod, YieldCurve, YieldCurvePoint};
//!
//! let curve = YieldCurve::new(
//!     vec![YieldCurvePoint::new(1.0, 0.04), YieldCurvePoint::new(10.0, 0.045)],
//!     CurveMethod::Linear,
//! )
//! .unwrap();
//! let bond: Bond = FixedRateBond::new(
//!     100.0,
//!     0.05,
//!     Date::from_ymd(2032, 3, 15).unwrap(),
//!     Frequency::SemiAnnual,
//!     DayCountConvention::Thirty360,
//! )
//! .unwrap()
//! .into();
//!
//! let settlement = Date::from_ymd(2025, 3, 15).unwrap();
//! let spread = z_spread(&bond, &curve, 99.0, settlement).unwrap();
//! assert!(spread.value() > 0.0);
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
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]

mod analyzer;
pub mod batch;
pub mod config;
pub mod credit;
pub mod spreads;
pub mod structured;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analyzer::{BondAnalysis, BondAnalyzer};
    pub use crate::batch::price_many;
    pub use crate::config::EngineConfig;
    pub use crate::credit::{
        decompose_credit_spread, default_probability, hazard_rate, CreditDecomposition,
    };
    pub use crate::spreads::{oas, z_spread, OasCalculator, OasResult, ZSpreadCalculator};
    pub use crate::structured::{abs_waterfall, psa, MortgagePool, PsaModel, Tranche, Waterfall};
}

pub use analyzer::{BondAnalysis, BondAnalyzer};
pub use config::EngineConfig;
