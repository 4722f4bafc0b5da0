//! Structured products: mortgage prepayment and ABS waterfalls.

mod prepayment;
mod waterfall;

pub use prepayment::{
    cpr_to_smm, psa, weighted_average_life, MortgagePool, PoolPeriod, PoolProjection, PsaModel,
};
pub use waterfall::{abs_waterfall, Tranche, TranchePayment, Waterfall, WaterfallResult};
