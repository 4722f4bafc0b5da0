//! # Bondlab Core
//!
//! Foundational types shared by every Bondlab crate:
//!
//! - **Errors**: the closed [`BondlabError`] taxonomy
//! - **Types**: `Date`, `Frequency`, `Percentage`/`BasisPoints`, `CashFlow`
//! - **Day Count Conventions**: 30/360, Act/360, Act/365, Act/Act ISDA
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: percentages and basis points are distinct newtypes and
//!   only convert explicitly
//! - **Validated Boundaries**: constructors reject malformed input with
//!   `InvalidInstrument` instead of producing values that fail later
//!
//! ## Example
//!
//! ```rust
//! use bondlab_core::prelude::*;
//!
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//! let yf = year_fraction(start, end, DayCountConvention::Thirty360).unwrap();
//! assert_eq!(yf, 0.5);
//!
//! let spread = BasisPoints::new(125.0).unwrap();
//! assert_eq!(Percentage::from(spread).value(), 1.25);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{year_fraction, DayCount, DayCountConvention};
    pub use crate::error::{BondlabError, BondlabResult};
    pub use crate::types::{
        BasisPoints, CashFlow, CashFlowKind, Date, Frequency, Percentage,
    };
}

pub use error::{BondlabError, BondlabResult};
