//! Domain types.

mod cashflow;
mod date;
mod frequency;
mod units;

pub use cashflow::{CashFlow, CashFlowKind};
pub use date::Date;
pub use frequency::Frequency;
pub use units::{BasisPoints, Percentage};
