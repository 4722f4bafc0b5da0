//! Quoted bonds as curve instruments.

use bondlab_core::types::Date;
use bondlab_core::{BondlabError, BondlabResult};
use bondlab_curves::bootstrap::{bootstrap, CurveInstrument};
use bondlab_curves::YieldCurve;

use crate::bond::Bond;
use crate::cashflows::{discounting_flows_on, Timeline};
use crate::pricing::accrued::accrued_on;

/// A bond with a market clean price at a settlement date.
///
/// Flows are timed once at construction with the same clock yield and
/// curve pricing use, so a bootstrapped curve reprices the quote through
/// [`price_from_curve`](crate::pricing::price_from_curve).
#[derive(Debug, Clone, PartialEq)]
pub struct BondQuote {
    bond: Bond,
    clean_price: f64,
    settlement: Date,
    flows: Vec<(f64, f64)>,
    dirty_price: f64,
}

impl BondQuote {
    /// Creates a quote. Fails if the bond cannot be valued at `settlement`
    /// or the price is not positive.
    pub fn new(bond: Bond, clean_price: f64, settlement: Date) -> BondlabResult<Self> {
        if !clean_price.is_finite() || clean_price <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "quoted clean price must be positive, got {clean_price}"
            )));
        }
        let timeline = Timeline::new(&bond, settlement)?;
        let flows = discounting_flows_on(&bond, &timeline)?
            .iter()
            .map(|f| (f.time, f.amount()))
            .collect();
        let dirty_price = clean_price + accrued_on(&bond, &timeline)?;

        Ok(Self {
            bond,
            clean_price,
            settlement,
            flows,
            dirty_price,
        })
    }

    /// The quoted bond.
    pub fn bond(&self) -> &Bond {
        &self.bond
    }

    /// Quoted clean price.
    pub fn clean_price(&self) -> f64 {
        self.clean_price
    }

    /// Settlement date of the quote.
    pub fn settlement(&self) -> Date {
        self.settlement
    }

    /// Clean price plus accrued.
    pub fn dirty_price(&self) -> f64 {
        self.dirty_price
    }
}

impl CurveInstrument for BondQuote {
    fn maturity(&self) -> f64 {
        self.flows.last().map_or(0.0, |(t, _)| *t)
    }

    fn cash_flows(&self) -> Vec<(f64, f64)> {
        self.flows.clone()
    }

    fn market_price(&self) -> f64 {
        self.dirty_price
    }

    fn description(&self) -> String {
        format!("{} bond maturing {}", self.bond.kind(), self.bond.maturity())
    }
}

/// Bootstraps a zero curve that reprices every quote.
///
/// All quotes should share a settlement date; curve times are measured
/// from it.
pub fn bootstrap_from_bonds(quotes: &[BondQuote]) -> BondlabResult<YieldCurve> {
    if let Some(first) = quotes.first() {
        if let Some(other) = quotes.iter().find(|q| q.settlement != first.settlement) {
            return Err(BondlabError::invalid_instrument(format!(
                "quotes settle on {} and {}",
                first.settlement, other.settlement
            )));
        }
    }
    bootstrap(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{FixedRateBond, ZeroCouponBond};
    use crate::pricing::price_from_curve;
    use approx::assert_relative_eq;
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn coupon_bond(coupon: f64, maturity: Date) -> Bond {
        FixedRateBond::new(
            100.0,
            coupon,
            maturity,
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_bootstrap_reprices_quotes() {
        let settlement = date(2025, 2, 10);
        let quotes = vec![
            BondQuote::new(
                ZeroCouponBond::new(100.0, date(2025, 8, 10), DayCountConvention::Thirty360)
                    .unwrap()
                    .into(),
                98.1,
                settlement,
            )
            .unwrap(),
            BondQuote::new(coupon_bond(0.04, date(2027, 1, 15)), 99.6, settlement).unwrap(),
            BondQuote::new(coupon_bond(0.0425, date(2030, 1, 15)), 99.1, settlement).unwrap(),
            BondQuote::new(coupon_bond(0.045, date(2035, 1, 15)), 98.4, settlement).unwrap(),
        ];

        let curve = bootstrap_from_bonds(&quotes).unwrap();
        assert_eq!(curve.len(), 4);

        for quote in &quotes {
            let repriced = price_from_curve(quote.bond(), &curve, settlement).unwrap();
            assert_relative_eq!(repriced.clean, quote.clean_price(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_mixed_settlements_rejected() {
        let a =
            BondQuote::new(coupon_bond(0.04, date(2027, 1, 15)), 99.6, date(2025, 2, 10)).unwrap();
        let b =
            BondQuote::new(coupon_bond(0.045, date(2030, 1, 15)), 99.0, date(2025, 2, 11)).unwrap();
        assert!(bootstrap_from_bonds(&[a, b]).is_err());
    }

    #[test]
    fn test_quote_includes_accrued() {
        let quote =
            BondQuote::new(coupon_bond(0.06, date(2030, 1, 15)), 101.0, date(2025, 4, 15)).unwrap();
        assert_relative_eq!(quote.dirty_price(), 101.0 + 1.5, epsilon = 1e-12);
        assert_relative_eq!(quote.market_price(), quote.dirty_price());
    }
}
