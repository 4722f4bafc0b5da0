//! Bonds with embedded options.
//!
//! Callable and putable bonds are valued on a recombining short-rate tree
//! calibrated to the discount curve:
//!
//! - [`BinomialTree`]: the lattice and backward induction
//! - [`ShortRateModel`] / [`HoLee`]: curve-consistent rate dynamics
//! - [`LatticePricer`]: exercise-aware valuation on the tree

mod binomial_tree;
mod lattice;
mod models;

pub use binomial_tree::BinomialTree;
pub use lattice::{LatticePricer, LatticeValuation, DEFAULT_STEPS_PER_PERIOD};
pub use models::{HoLee, ShortRateModel};
