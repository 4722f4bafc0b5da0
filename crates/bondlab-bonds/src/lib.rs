//! # Bondlab Bonds
//!
//! Bond instruments and their valuation.
//!
//! This crate provides:
//!
//! - **Instruments**: fixed-rate, floating-rate, zero-coupon, callable and
//!   putable bonds ([`bond`])
//! - **Cash Flows**: coupon schedules rolled back from maturity and their
//!   discounting times ([`cashflows`])
//! - **Pricing**: price from yield, yield from price, accrued interest,
//!   curve pricing and bond-quote bootstrapping ([`pricing`])
//! - **Risk**: Macaulay and modified duration, convexity, DV01, effective
//!   and key-rate measures ([`risk`])
//! - **Options**: Ho-Lee lattice pricing of embedded calls and puts
//!   ([`options`])
//!
//! ## Example
//!
//! ```rust
//! use bondlab_bonds::prelude::*;
//! use bondlab_core::prelude::*;
//!
//! let bond: Bond = FixedRateBond::new(
//!     1000.0,
//!     0.05,
//!     Date::from_ymd(2030, 1, 15).unwrap(),
//!     Frequency::SemiAnnual,
//!     DayCountConvention::Thirty360,
//! )
//! .unwrap()
//! .into();
//! let settlement = Date::from_ymd(2025, 1, 15).unwrap();
//!
//! let result = price(&bond, 0.05, settlement).unwrap();
//! assert!((result.clean - 1000.0).abs() < 1e-9);
//!
//! let ytm = yield_from_price(&bond, result.clean, settlement).unwrap();
//! assert!((ytm - 0.05).abs() < 1e-8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]

pub mod bond;
pub mod cashflows;
pub mod options;
pub mod pricing;
pub mod risk;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bond::{
        Bond, EmbeddedOptionBond, ExerciseEntry, FixedRateBond, FloatingRateNote, ZeroCouponBond,
    };
    pub use crate::cashflows::{cash_flows, timed_cash_flows, Timeline, TimedCashFlow};
    pub use crate::options::{HoLee, LatticePricer, LatticeValuation, ShortRateModel};
    pub use crate::pricing::{
        accrued_interest, bootstrap_from_bonds, price, price_from_curve, price_from_yield,
        yield_from_price, yield_to_call, yield_to_put, yield_to_worst, BondQuote, PriceResult,
        YieldSolver,
    };
    pub use crate::risk::{
        convexity, dv01, effective_risk_on_curve, key_rate_durations, macaulay_duration,
        modified_duration, risk_metrics, RiskMetrics,
    };
}

pub use bond::Bond;
