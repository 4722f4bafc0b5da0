//! Batch entry points.
//!
//! Bonds are independent, so a batch is a plain map: a rayon parallel
//! iterator with the `parallel` feature (on by default), a sequential one
//! without it. Results come back in input order with one `Result` per
//! bond, so one bad instrument does not fail the batch.

use bondlab_bonds::pricing::{price_from_curve, PriceResult};
use bondlab_bonds::Bond;
use bondlab_core::types::Date;
use bondlab_core::BondlabResult;
use bondlab_curves::YieldCurve;

/// Prices every bond off `curve`.
pub fn price_many(
    bonds: &[Bond],
    curve: &YieldCurve,
    settlement: Date,
) -> Vec<BondlabResult<PriceResult>> {
    map_batch(bonds, |bond| price_from_curve(bond, curve, settlement))
}

#[cfg(feature = "parallel")]
pub(crate) fn map_batch<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;

    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_batch<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bondlab_bonds::bond::{FixedRateBond, ZeroCouponBond};
    use bondlab_core::daycounts::DayCountConvention;
    use bondlab_core::types::Frequency;
    use bondlab_curves::{CurveMethod, YieldCurvePoint};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_batch_matches_single_pricing_in_order() {
        let curve = YieldCurve::new(
            vec![YieldCurvePoint::new(1.0, 0.04), YieldCurvePoint::new(10.0, 0.045)],
            CurveMethod::Linear,
        )
        .unwrap();
        let settlement = date(2025, 1, 15);
        let bonds: Vec<Bond> = (1..=12)
            .map(|years| {
                FixedRateBond::new(
                    100.0,
                    0.03 + f64::from(years) * 0.001,
                    date(2025 + years, 1, 15),
                    Frequency::SemiAnnual,
                    DayCountConvention::Thirty360,
                )
                .unwrap()
                .into()
            })
            .collect();

        let batch = price_many(&bonds, &curve, settlement);
        assert_eq!(batch.len(), bonds.len());
        for (bond, result) in bonds.iter().zip(&batch) {
            let single = price_from_curve(bond, &curve, settlement).unwrap();
            assert_relative_eq!(result.as_ref().unwrap().clean, single.clean);
        }
    }

    #[test]
    fn test_failures_stay_per_bond() {
        let curve =
            YieldCurve::new(vec![YieldCurvePoint::new(5.0, 0.04)], CurveMethod::Linear).unwrap();
        let settlement = date(2025, 1, 15);
        let bonds: Vec<Bond> = vec![
            ZeroCouponBond::new(100.0, date(2030, 1, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into(),
            ZeroCouponBond::new(100.0, date(2024, 1, 15), DayCountConvention::Thirty360)
                .unwrap()
                .into(),
        ];

        let batch = price_many(&bonds, &curve, settlement);
        assert!(batch[0].is_ok());
        assert!(batch[1].is_err());
    }
}
