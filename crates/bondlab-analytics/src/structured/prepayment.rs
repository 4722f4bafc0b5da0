//! PSA prepayment, mortgage pool projection and weighted average life.
//!
//! The PSA benchmark ramps the conditional prepayment rate by 0.2 % a
//! month to 6 % at month 30 and holds it there; a speed scales the ramp:
//!
//! ```text
//! CPR(month) = min(month / 30, 1) · 6 % · speed
//! SMM        = 1 - (1 - CPR)^(1/12)
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use bondlab_core::types::Percentage;
use bondlab_core::{BondlabError, BondlabResult};

/// Month at which the PSA ramp tops out.
const PSA_RAMP_MONTHS: f64 = 30.0;

/// Benchmark CPR at 100 % PSA after the ramp, in percent.
const PSA_BASE_CPR: f64 = 6.0;

/// Balances below this are treated as paid off.
const BALANCE_EPSILON: f64 = 1e-8;

/// PSA speed and the CPR it implies at one loan age.
///
/// Only constructed from a month and a speed; the two rates cannot be set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsaModel {
    psa_rate: Percentage,
    cpr: Percentage,
}

impl PsaModel {
    /// PSA model at loan age `month` and `speed` (100 % = benchmark).
    pub fn new(month: u32, speed: Percentage) -> BondlabResult<Self> {
        Ok(Self {
            psa_rate: speed,
            cpr: psa(month, speed)?,
        })
    }

    /// The PSA speed.
    pub fn psa_rate(&self) -> Percentage {
        self.psa_rate
    }

    /// Annual conditional prepayment rate.
    pub fn cpr(&self) -> Percentage {
        self.cpr
    }

    /// Single monthly mortality.
    pub fn smm(&self) -> f64 {
        cpr_to_smm(self.cpr.as_decimal())
    }
}

/// CPR at loan age `month` under `speed` PSA.
///
/// ```rust
/// use bondlab_analytics::structured::psa;
/// use bondlab_core::types::Percentage;
///
/// let full = Percentage::new(100.0).unwrap();
/// assert_eq!(psa(30, full).unwrap().value(), 6.0);
/// assert_eq!(psa(15, full).unwrap().value(), 3.0);
/// ```
pub fn psa(month: u32, speed: Percentage) -> BondlabResult<Percentage> {
    if speed.value() < 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "PSA speed must be non-negative, got {speed}"
        )));
    }
    let ramp = (f64::from(month) / PSA_RAMP_MONTHS).min(1.0);
    let cpr = (ramp * PSA_BASE_CPR * speed.as_decimal()).min(100.0);
    Percentage::new(cpr)
}

/// Monthly rate equivalent to an annual CPR (decimal).
pub fn cpr_to_smm(cpr: f64) -> f64 {
    1.0 - (1.0 - cpr.clamp(0.0, 1.0)).powf(1.0 / 12.0)
}

/// Weighted average life of `(time in years, principal)` pairs.
pub fn weighted_average_life(principal: &[(f64, f64)]) -> BondlabResult<f64> {
    let (weighted, total) = principal
        .iter()
        .fold((0.0, 0.0), |(w, s), &(t, p)| (w + t * p, s + p));
    if !(total > 0.0) {
        return Err(BondlabError::calculation("no principal to weight"));
    }
    Ok(weighted / total)
}

/// A level-payment mortgage pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MortgagePool {
    balance: f64,
    annual_rate: f64,
    remaining_months: u32,
    age_months: u32,
}

/// One month of a pool projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolPeriod {
    /// Month number from the projection start (1-based).
    pub month: u32,
    /// Balance at the start of the month.
    pub beginning_balance: f64,
    /// Interest paid.
    pub interest: f64,
    /// Scheduled amortisation.
    pub scheduled_principal: f64,
    /// Voluntary prepayment.
    pub prepayment: f64,
    /// Balance at the end of the month.
    pub ending_balance: f64,
}

impl PoolPeriod {
    /// Scheduled principal plus prepayment.
    pub fn total_principal(&self) -> f64 {
        self.scheduled_principal + self.prepayment
    }
}

/// Month-by-month projection of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolProjection {
    /// Projected months, ending when the pool pays off.
    pub periods: Vec<PoolPeriod>,
}

impl PoolProjection {
    /// Weighted average life in years.
    pub fn weighted_average_life(&self) -> BondlabResult<f64> {
        let principal: Vec<(f64, f64)> = self
            .periods
            .iter()
            .map(|p| (f64::from(p.month) / 12.0, p.total_principal()))
            .collect();
        weighted_average_life(&principal)
    }

    /// Total prepayments over the projection.
    pub fn total_prepayment(&self) -> f64 {
        self.periods.iter().map(|p| p.prepayment).sum()
    }
}

impl MortgagePool {
    /// Creates a pool. `annual_rate` is a decimal note rate.
    pub fn new(
        balance: f64,
        annual_rate: f64,
        remaining_months: u32,
        age_months: u32,
    ) -> BondlabResult<Self> {
        if !balance.is_finite() || balance <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "pool balance must be positive, got {balance}"
            )));
        }
        if !annual_rate.is_finite() || annual_rate < 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "mortgage rate must be non-negative, got {annual_rate}"
            )));
        }
        if remaining_months == 0 {
            return Err(BondlabError::invalid_instrument("pool has no remaining term"));
        }
        Ok(Self {
            balance,
            annual_rate,
            remaining_months,
            age_months,
        })
    }

    /// Current balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Remaining term in months.
    pub fn remaining_months(&self) -> u32 {
        self.remaining_months
    }

    /// Projects the pool under `speed` PSA.
    pub fn project(&self, speed: Percentage) -> BondlabResult<PoolProjection> {
        let monthly_rate = self.annual_rate / 12.0;
        let mut balance = self.balance;
        let mut periods = Vec::with_capacity(self.remaining_months as usize);

        for month in 1..=self.remaining_months {
            if balance < BALANCE_EPSILON {
                break;
            }
            let remaining = self.remaining_months - month + 1;
            let smm = PsaModel::new(self.age_months.saturating_add(month), speed)?.smm();

            let interest = balance * monthly_rate;
            let scheduled =
                (level_payment(balance, monthly_rate, remaining) - interest).clamp(0.0, balance);
            let prepayment = (balance - scheduled) * smm;
            let ending = (balance - scheduled - prepayment).max(0.0);

            periods.push(PoolPeriod {
                month,
                beginning_balance: balance,
                interest,
                scheduled_principal: scheduled,
                prepayment,
                ending_balance: ending,
            });
            balance = ending;
        }

        debug!(
            "pool projection at {speed} PSA: {} months, {:.2} prepaid",
            periods.len(),
            periods.iter().map(|p| p.prepayment).sum::<f64>()
        );
        Ok(PoolProjection { periods })
    }

    /// Weighted average life under `speed` PSA.
    pub fn weighted_average_life(&self, speed: Percentage) -> BondlabResult<f64> {
        self.project(speed)?.weighted_average_life()
    }
}

/// Level payment that amortises `balance` over `months`.
fn level_payment(balance: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return balance / f64::from(months);
    }
    let growth = (1.0 + monthly_rate).powf(f64::from(months));
    balance * monthly_rate * growth / (growth - 1.0)
}
