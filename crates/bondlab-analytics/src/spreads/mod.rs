//! Curve-relative spreads.
//!
//! - [`z_spread`]: constant spread over the zero curve
//! - [`oas`]: option-adjusted spread from the lattice
//!
//! Both take a clean market price and solve against the dirty price.
//! Spreads are returned in basis points.

mod oas;
mod zspread;

pub use oas::{oas, OasCalculator, OasResult, DEFAULT_OAS_BRACKET};
pub use zspread::{z_spread, ZSpreadCalculator};
