//! Sequential-pay ABS cash-flow waterfall.
//!
//! Available cash is applied to tranches in ascending `priority` (1 is
//! most senior). Each tranche receives its scheduled interest
//! `size × rate` and then its principal before anything flows further
//! down. A junior tranche is paid only from what the seniors leave, so a
//! shortfall reaches the bottom of the structure first. Whatever is left
//! after the last tranche is the residual.
//!
//! Amounts are `Decimal`, so paid plus residual equals the cash in
//! exactly.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bondlab_core::{BondlabError, BondlabResult};

/// A tranche of an ABS structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    /// Tranche label.
    pub name: String,
    /// Outstanding principal.
    pub size: Decimal,
    /// Interest rate for the period (decimal).
    pub rate: Decimal,
    /// Payment rank; lower is paid first.
    pub priority: u32,
}

impl Tranche {
    /// Creates a tranche; size and rate must be non-negative.
    pub fn new(
        name: impl Into<String>,
        size: Decimal,
        rate: Decimal,
        priority: u32,
    ) -> BondlabResult<Self> {
        let name = name.into();
        if size < Decimal::ZERO {
            return Err(BondlabError::invalid_instrument(format!(
                "tranche {name} has negative size {size}"
            )));
        }
        if rate < Decimal::ZERO {
            return Err(BondlabError::invalid_instrument(format!(
                "tranche {name} has negative rate {rate}"
            )));
        }
        Ok(Self {
            name,
            size,
            rate,
            priority,
        })
    }

    /// Interest due for the period.
    pub fn interest_due(&self) -> Decimal {
        self.size * self.rate
    }
}

/// What one tranche received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranchePayment {
    /// Tranche label.
    pub name: String,
    /// Payment rank.
    pub priority: u32,
    /// Interest paid.
    pub interest_paid: Decimal,
    /// Principal paid.
    pub principal_paid: Decimal,
    /// Interest due but not paid.
    pub interest_shortfall: Decimal,
    /// Principal due but not paid.
    pub principal_shortfall: Decimal,
}

impl TranchePayment {
    /// Interest plus principal.
    pub fn total_paid(&self) -> Decimal {
        self.interest_paid + self.principal_paid
    }

    /// Whether the tranche was paid in full.
    pub fn is_paid_in_full(&self) -> bool {
        self.interest_shortfall.is_zero() && self.principal_shortfall.is_zero()
    }
}

/// Outcome of one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallResult {
    /// Payments in priority order.
    pub payments: Vec<TranchePayment>,
    /// Cash left after every tranche.
    pub residual: Decimal,
}

impl WaterfallResult {
    /// Total paid to tranches.
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(TranchePayment::total_paid).sum()
    }
}

/// A validated tranche structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waterfall {
    tranches: Vec<Tranche>,
}

impl Waterfall {
    /// Sorts `tranches` by priority; duplicate priorities are rejected.
    pub fn new(mut tranches: Vec<Tranche>) -> BondlabResult<Self> {
        if tranches.is_empty() {
            return Err(BondlabError::invalid_instrument("waterfall has no tranches"));
        }
        if let Some(bad) = tranches
            .iter()
            .find(|t| t.size < Decimal::ZERO || t.rate < Decimal::ZERO)
        {
            return Err(BondlabError::invalid_instrument(format!(
                "tranche {} has a negative size or rate",
                bad.name
            )));
        }
        tranches.sort_by_key(|t| t.priority);
        if let Some(pair) = tranches.windows(2).find(|w| w[0].priority == w[1].priority) {
            return Err(BondlabError::invalid_instrument(format!(
                "tranches {} and {} share priority {}",
                pair[0].name, pair[1].name, pair[0].priority
            )));
        }
        Ok(Self { tranches })
    }

    /// Tranches in payment order.
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    /// Distributes `total_cash` down the structure.
    pub fn distribute(&self, total_cash: Decimal) -> BondlabResult<WaterfallResult> {
        if total_cash < Decimal::ZERO {
            return Err(BondlabError::invalid_instrument(format!(
                "cash to distribute is negative: {total_cash}"
            )));
        }

        let mut remaining = total_cash;
        let payments: Vec<TranchePayment> = self
            .tranches
            .iter()
            .map(|tranche| {
                let interest_due = tranche.interest_due();
                let interest_paid = interest_due.min(remaining);
                remaining -= interest_paid;

                let principal_paid = tranche.size.min(remaining);
                remaining -= principal_paid;

                TranchePayment {
                    name: tranche.name.clone(),
                    priority: tranche.priority,
                    interest_paid,
                    principal_paid,
                    interest_shortfall: interest_due - interest_paid,
                    principal_shortfall: tranche.size - principal_paid,
                }
            })
            .collect();

        debug!(
            "waterfall: {} distributed over {} tranches, residual {remaining}",
            total_cash - remaining,
            payments.len()
        );
        Ok(WaterfallResult {
            payments,
            residual: remaining,
        })
    }
}

/// Validates `tranches` and distributes `total_cash` in one call.
pub fn abs_waterfall(
    tranches: Vec<Tranche>,
    total_cash: Decimal,
) -> BondlabResult<WaterfallResult> {
    Waterfall::new(tranches)?.distribute(total_cash)
}
