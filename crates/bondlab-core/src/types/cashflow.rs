//! Cash flow records.

use serde::{Deserialize, Serialize};

use crate::types::Date;

/// What a cash flow pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashFlowKind {
    /// A periodic coupon.
    Coupon,
    /// Scheduled principal, possibly bundled with the final coupon.
    Principal,
    /// Unscheduled principal (mortgage prepayment).
    Prepayment,
}

/// A dated payment split into interest and principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Payment date.
    pub date: Date,
    /// Interest portion.
    pub interest: f64,
    /// Principal portion.
    pub principal: f64,
    /// Kind of payment.
    pub kind: CashFlowKind,
}

impl CashFlow {
    /// A pure coupon payment.
    pub fn coupon(date: Date, amount: f64) -> Self {
        Self {
            date,
            interest: amount,
            principal: 0.0,
            kind: CashFlowKind::Coupon,
        }
    }

    /// A principal redemption, optionally carrying the final coupon.
    pub fn redemption(date: Date, coupon: f64, principal: f64) -> Self {
        Self {
            date,
            interest: coupon,
            principal,
            kind: CashFlowKind::Principal,
        }
    }

    /// An unscheduled principal payment.
    pub fn prepayment(date: Date, principal: f64) -> Self {
        Self {
            date,
            interest: 0.0,
            principal,
            kind: CashFlowKind::Prepayment,
        }
    }

    /// Total amount paid.
    pub fn amount(&self) -> f64 {
        self.interest + self.principal
    }
}
