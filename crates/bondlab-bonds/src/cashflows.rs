//! Cash-flow generation and timing.
//!
//! Coupon dates are rolled backward from maturity in whole months
//! (end-of-month clamped), each date computed from maturity directly so a
//! short month never drags later dates. Generation stops at the first date
//! on or before settlement, which becomes the previous coupon date.
//!
//! [`Timeline`] converts dates into years from settlement with the street
//! convention: the k-th remaining coupon sits at `(w + k - 1) / m`, where
//! `w` is the fraction of the current period still to run, measured in
//! the bond's day count. Yield pricing, curve pricing, bootstrap quotes and
//! the lattice all read times from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bondlab_core::daycounts::{year_fraction, DayCountConvention};
use bondlab_core::types::{CashFlow, Date, Frequency};
use bondlab_core::{BondlabError, BondlabResult};

use crate::bond::Bond;

/// The coupon period containing a settlement date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponPeriod {
    /// Scheduled coupon date on or before settlement.
    pub previous: Date,
    /// First coupon date after settlement.
    pub next: Date,
    /// Start of accrual: `previous`, clipped to the issue date.
    pub accrual_start: Date,
}

impl CouponPeriod {
    /// Days in the full period under `day_count`.
    pub fn period_days(&self, day_count: DayCountConvention) -> i64 {
        day_count.to_day_count().day_count(self.previous, self.next)
    }

    /// Fraction of the period accrued at `settlement`, as a `Decimal`.
    pub fn elapsed_fraction(
        &self,
        settlement: Date,
        day_count: DayCountConvention,
    ) -> BondlabResult<Decimal> {
        let dc = day_count.to_day_count();
        let period = dc.day_count(self.previous, self.next);
        if period <= 0 {
            return Err(degenerate_period(self, day_count));
        }
        let accrued = dc.day_count(self.accrual_start, settlement).max(0);
        Ok(Decimal::from(accrued) / Decimal::from(period))
    }

    /// Fraction of the period from `settlement` to the next coupon.
    pub fn remaining_fraction(
        &self,
        settlement: Date,
        day_count: DayCountConvention,
    ) -> BondlabResult<f64> {
        let dc = day_count.to_day_count();
        let period = dc.day_count(self.previous, self.next);
        if period <= 0 {
            return Err(degenerate_period(self, day_count));
        }
        let remaining = dc.day_count(settlement, self.next).max(0);
        Ok(remaining as f64 / period as f64)
    }
}

/// A cash flow with its time in years from settlement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedCashFlow {
    /// The payment.
    pub cash_flow: CashFlow,
    /// Years from settlement.
    pub time: f64,
}

impl TimedCashFlow {
    /// Total amount paid.
    pub fn amount(&self) -> f64 {
        self.cash_flow.amount()
    }
}

/// Year-fraction clock for one bond at one settlement date.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    settlement: Date,
    maturity: Date,
    day_count: DayCountConvention,
    schedule: Option<Schedule>,
}

#[derive(Debug, Clone, PartialEq)]
struct Schedule {
    /// `dates[0]` is the previous coupon date; the rest are future coupons.
    dates: Vec<Date>,
    period: CouponPeriod,
    periods_per_year: f64,
    remaining: f64,
}

impl Timeline {
    /// Builds the clock, validating the bond for `settlement`.
    pub fn new(bond: &Bond, settlement: Date) -> BondlabResult<Self> {
        bond.validate_for(settlement)?;
        let day_count = bond.day_count();

        let schedule = if bond.has_coupons() {
            let dates = roll_back(bond.maturity(), bond.frequency(), settlement)?;
            let previous = dates[0];
            let period = CouponPeriod {
                previous,
                next: dates[1],
                accrual_start: bond.issue_date().map_or(previous, |issue| issue.max(previous)),
            };
            let remaining = period.remaining_fraction(settlement, day_count)?;
            Some(Schedule {
                dates,
                period,
                periods_per_year: bond.periods_per_year(),
                remaining,
            })
        } else {
            None
        };

        Ok(Self {
            settlement,
            maturity: bond.maturity(),
            day_count,
            schedule,
        })
    }

    /// Settlement date.
    pub fn settlement(&self) -> Date {
        self.settlement
    }

    /// The current coupon period; `None` for zero coupons.
    pub fn coupon_period(&self) -> Option<CouponPeriod> {
        self.schedule.as_ref().map(|s| s.period)
    }

    /// Coupon dates after settlement (empty for zero coupons).
    pub fn coupon_dates(&self) -> &[Date] {
        self.schedule.as_ref().map_or(&[], |s| &s.dates[1..])
    }

    /// Fraction of the current period left to run (1 for zero coupons).
    pub fn remaining_fraction(&self) -> f64 {
        self.schedule.as_ref().map_or(1.0, |s| s.remaining)
    }

    /// Time of the `k`-th remaining coupon (1-based) in years.
    pub fn coupon_time(&self, k: usize) -> f64 {
        match &self.schedule {
            Some(s) => (s.remaining + (k as f64 - 1.0)) / s.periods_per_year,
            None => 0.0,
        }
    }

    /// Years from settlement to `date`, which must lie in
    /// `[settlement, maturity]`.
    ///
    /// Between coupon dates the time moves linearly in the bond's day
    /// count, so dates on the schedule match [`Timeline::coupon_time`].
    pub fn time_of(&self, date: Date) -> BondlabResult<f64> {
        if date < self.settlement || date > self.maturity {
            return Err(BondlabError::invalid_instrument(format!(
                "date {date} outside [{}, {}]",
                self.settlement, self.maturity
            )));
        }

        let Some(schedule) = &self.schedule else {
            return year_fraction(self.settlement, date, self.day_count);
        };

        let dc = self.day_count.to_day_count();
        let dates = &schedule.dates;
        let i = dates.partition_point(|d| *d <= date).saturating_sub(1);
        let m = schedule.periods_per_year;

        if i + 1 >= dates.len() {
            return Ok(self.coupon_time(i));
        }

        let period = dc.day_count(dates[i], dates[i + 1]);
        if period <= 0 {
            return Err(BondlabError::calculation(format!(
                "empty coupon period {} to {}",
                dates[i],
                dates[i + 1]
            )));
        }

        if i == 0 {
            let run = dc.day_count(self.settlement, date).max(0) as f64;
            return Ok(run / period as f64 / m);
        }
        let partial = dc.day_count(dates[i], date) as f64 / period as f64;
        Ok((schedule.remaining + (i as f64 - 1.0) + partial) / m)
    }
}

/// The coupon period around `settlement`; `None` for zero coupons.
pub fn coupon_period(bond: &Bond, settlement: Date) -> BondlabResult<Option<CouponPeriod>> {
    Ok(Timeline::new(bond, settlement)?.coupon_period())
}

/// Remaining cash flows strictly after `as_of`, in date order.
///
/// The final flow bundles the last coupon with principal. Floating notes
/// project every coupon at reference plus spread. A bond that has already
/// matured yields no flows.
pub fn cash_flows(bond: &Bond, as_of: Date) -> BondlabResult<Vec<CashFlow>> {
    bond.validate()?;
    let maturity = bond.maturity();
    if as_of >= maturity {
        return Ok(Vec::new());
    }

    if !bond.has_coupons() {
        return Ok(vec![CashFlow::redemption(maturity, 0.0, bond.face_value())]);
    }

    let start = bond.issue_date().map_or(as_of, |issue| issue.max(as_of));
    let coupon = bond.coupon_amount();
    let dates = roll_back(maturity, bond.frequency(), as_of)?;

    Ok(dates
        .into_iter()
        .filter(|d| *d > start)
        .map(|d| {
            if d == maturity {
                CashFlow::redemption(d, coupon, bond.face_value())
            } else {
                CashFlow::coupon(d, coupon)
            }
        })
        .collect())
}

/// Remaining cash flows with their times from settlement.
pub fn timed_cash_flows(bond: &Bond, settlement: Date) -> BondlabResult<Vec<TimedCashFlow>> {
    let timeline = Timeline::new(bond, settlement)?;
    timed_flows_on(bond, &timeline)
}

/// The flows a valuation discounts.
///
/// Identical to [`timed_cash_flows`] except for floating notes, which
/// reduce to par plus the next coupon at the next reset.
pub fn discounting_flows(bond: &Bond, settlement: Date) -> BondlabResult<Vec<TimedCashFlow>> {
    let timeline = Timeline::new(bond, settlement)?;
    discounting_flows_on(bond, &timeline)
}

pub(crate) fn discounting_flows_on(
    bond: &Bond,
    timeline: &Timeline,
) -> BondlabResult<Vec<TimedCashFlow>> {
    match bond {
        Bond::Floating(note) => {
            let next = timeline
                .coupon_dates()
                .first()
                .copied()
                .ok_or_else(|| BondlabError::calculation("floating note has no future reset"))?;
            Ok(vec![TimedCashFlow {
                cash_flow: CashFlow::redemption(next, bond.coupon_amount(), note.face_value()),
                time: timeline.coupon_time(1),
            }])
        }
        _ => timed_flows_on(bond, timeline),
    }
}

pub(crate) fn timed_flows_on(
    bond: &Bond,
    timeline: &Timeline,
) -> BondlabResult<Vec<TimedCashFlow>> {
    if !bond.has_coupons() {
        let maturity = bond.maturity();
        return Ok(vec![TimedCashFlow {
            cash_flow: CashFlow::redemption(maturity, 0.0, bond.face_value()),
            time: timeline.time_of(maturity)?,
        }]);
    }

    let coupon = bond.coupon_amount();
    let dates = timeline.coupon_dates();
    let last = dates.len();

    Ok(dates
        .iter()
        .enumerate()
        .map(|(index, &date)| {
            let k = index + 1;
            let cash_flow = if k == last {
                CashFlow::redemption(date, coupon, bond.face_value())
            } else {
                CashFlow::coupon(date, coupon)
            };
            TimedCashFlow {
                cash_flow,
                time: timeline.coupon_time(k),
            }
        })
        .collect())
}

/// Coupon dates from the first one on or before `settlement` up to
/// maturity, ascending.
fn roll_back(maturity: Date, frequency: Frequency, settlement: Date) -> BondlabResult<Vec<Date>> {
    let step = frequency.months_per_period() as i32;
    let mut dates = vec![maturity];
    let mut k = 1;
    loop {
        let date = maturity.add_months(-k * step)?;
        dates.push(date);
        if date <= settlement {
            break;
        }
        k += 1;
    }
    dates.reverse();
    Ok(dates)
}

fn degenerate_period(period: &CouponPeriod, day_count: DayCountConvention) -> BondlabError {
    BondlabError::calculation(format!(
        "coupon period {} to {} has no {} days",
        period.previous,
        period.next,
        day_count.name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{FixedRateBond, FloatingRateNote, ZeroCouponBond};
    use approx::assert_relative_eq;
    use bondlab_core::types::{BasisPoints, CashFlowKind};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn semi_annual(maturity: Date) -> Bond {
        FixedRateBond::new(
            1000.0,
            0.05,
            maturity,
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_schedule_rolls_back_from_maturity() {
        let bond = semi_annual(date(2027, 6, 15));
        let flows = cash_flows(&bond, date(2025, 3, 1)).unwrap();

        let dates: Vec<Date> = flows.iter().map(|f| f.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 6, 15),
                date(2025, 12, 15),
                date(2026, 6, 15),
                date(2026, 12, 15),
                date(2027, 6, 15),
            ]
        );
        assert!(flows[..4].iter().all(|f| f.kind == CashFlowKind::Coupon));
        assert_relative_eq!(flows[0].amount(), 25.0);

        let last = flows[4];
        assert_eq!(last.kind, CashFlowKind::Principal);
        assert_relative_eq!(last.interest, 25.0);
        assert_relative_eq!(last.principal, 1000.0);
    }

    #[test]
    fn test_flows_strictly_after_as_of() {
        let bond = semi_annual(date(2027, 6, 15));
        let flows = cash_flows(&bond, date(2025, 6, 15)).unwrap();
        assert_eq!(flows[0].date, date(2025, 12, 15));
        assert!(cash_flows(&bond, date(2027, 6, 15)).unwrap().is_empty());
    }

    #[test]
    fn test_end_of_month_clamping() {
        let bond = semi_annual(date(2026, 8, 31));
        let flows = cash_flows(&bond, date(2025, 1, 10)).unwrap();
        let dates: Vec<Date> = flows.iter().map(|f| f.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 2, 28), date(2025, 8, 31), date(2026, 2, 28), date(2026, 8, 31)]
        );
    }

    #[test]
    fn test_issue_date_clips_schedule() {
        let bond: Bond = FixedRateBond::new(
            100.0,
            0.04,
            date(2026, 6, 15),
            Frequency::SemiAnnual,
            DayCountConvention::Thirty360,
        )
        .unwrap()
        .with_issue_date(date(2025, 3, 1))
        .unwrap()
        .into();

        let flows = cash_flows(&bond, date(2024, 1, 1)).unwrap();
        assert_eq!(flows[0].date, date(2025, 6, 15));
        assert_eq!(flows.len(), 3);

        let period = coupon_period(&bond, date(2025, 4, 1)).unwrap().unwrap();
        assert_eq!(period.previous, date(2024, 12, 15));
        assert_eq!(period.accrual_start, date(2025, 3, 1));
    }

    #[test]
    fn test_street_convention_times() {
        let bond = semi_annual(date(2027, 6, 15));
        // 30/360: 74 of 180 days remain.
        let flows = timed_cash_flows(&bond, date(2025, 4, 1)).unwrap();

        let w = 74.0 / 180.0;
        assert_relative_eq!(flows[0].time, w / 2.0, epsilon = 1e-12);
        assert_relative_eq!(flows[1].time, (w + 1.0) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(flows[4].time, (w + 4.0) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_time_of_matches_coupon_times() {
        let bond = semi_annual(date(2030, 6, 15));
        let settlement = date(2025, 2, 3);
        let timeline = Timeline::new(&bond, settlement).unwrap();

        assert_relative_eq!(timeline.time_of(settlement).unwrap(), 0.0);
        for (k, &d) in timeline.coupon_dates().iter().enumerate() {
            assert_relative_eq!(
                timeline.time_of(d).unwrap(),
                timeline.coupon_time(k + 1),
                epsilon = 1e-12
            );
        }

        // Mid-period dates sit between their coupon dates.
        let mid = timeline.time_of(date(2027, 9, 15)).unwrap();
        assert!(mid > timeline.time_of(date(2027, 6, 15)).unwrap());
        assert!(mid < timeline.time_of(date(2027, 12, 15)).unwrap());

        assert!(timeline.time_of(date(2031, 1, 1)).is_err());
        assert!(timeline.time_of(date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_zero_coupon_single_flow() {
        let bond: Bond =
            ZeroCouponBond::new(1000.0, date(2030, 1, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into();
        let flows = timed_cash_flows(&bond, date(2025, 1, 15)).unwrap();

        assert_eq!(flows.len(), 1);
        assert_relative_eq!(flows[0].time, 5.0, epsilon = 1e-12);
        assert_relative_eq!(flows[0].amount(), 1000.0);
        assert!(coupon_period(&bond, date(2025, 1, 15)).unwrap().is_none());
    }

    #[test]
    fn test_floating_note_discounts_to_next_reset() {
        let bond: Bond = FloatingRateNote::new(
            100.0,
            BasisPoints::new(50.0).unwrap(),
            date(2028, 3, 15),
            Frequency::Quarterly,
            DayCountConvention::Act360,
            0.03,
        )
        .unwrap()
        .into();

        let projected = timed_cash_flows(&bond, date(2025, 1, 2)).unwrap();
        assert_eq!(projected.len(), 13);
        assert_relative_eq!(projected[0].amount(), 0.875, epsilon = 1e-12);

        let discounted = discounting_flows(&bond, date(2025, 1, 2)).unwrap();
        assert_eq!(discounted.len(), 1);
        assert_eq!(discounted[0].cash_flow.date, date(2025, 3, 15));
        assert_relative_eq!(discounted[0].amount(), 100.875, epsilon = 1e-12);
    }

    #[test]
    fn test_valuation_rejects_matured_bond() {
        let bond = semi_annual(date(2025, 6, 15));
        assert!(timed_cash_flows(&bond, date(2025, 6, 15)).is_err());
    }
}
