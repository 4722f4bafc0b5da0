//! Integration tests: yield/price consistency, risk direction and
//! lattice bounds across the public API.

use approx::assert_relative_eq;
use proptest::prelude::*;

use bondlab_bonds::prelude::*;
use bondlab_core::prelude::*;
use bondlab_curves::prelude::*;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn semi_annual(face: f64, coupon: f64, maturity: Date) -> Bond {
    FixedRateBond::new(face, coupon, maturity, Frequency::SemiAnnual, DayCountConvention::Thirty360)
        .unwrap()
        .into()
}

#[test]
fn test_par_bond_prices_at_par() {
    let bond = semi_annual(1000.0, 0.05, date(2035, 1, 15));
    let settlement = date(2025, 1, 15);

    let result = price(&bond, 0.05, settlement).unwrap();
    assert_relative_eq!(result.clean, 1000.0, epsilon = 1e-9);
    assert_relative_eq!(result.accrued, 0.0);
}

#[test]
fn test_zero_coupon_reference_values() {
    let bond: Bond = ZeroCouponBond::new(1000.0, date(2030, 1, 15), DayCountConvention::Thirty360)
        .unwrap()
        .into();
    let settlement = date(2025, 1, 15);

    let clean = price_from_yield(&bond, 0.06, settlement).unwrap();
    assert_relative_eq!(clean, 747.258, epsilon = 1e-3);
    assert_relative_eq!(macaulay_duration(&bond, 0.06, settlement).unwrap(), 5.0, epsilon = 1e-12);
    assert_relative_eq!(
        modified_duration(&bond, 0.06, settlement).unwrap(),
        5.0 / 1.06,
        epsilon = 1e-12
    );
}

#[test]
fn test_price_falls_as_yield_rises() {
    let bond = semi_annual(100.0, 0.045, date(2034, 6, 30));
    let settlement = date(2025, 3, 17);

    let prices: Vec<f64> = [0.02, 0.04, 0.06, 0.08]
        .iter()
        .map(|&y| price_from_yield(&bond, y, settlement).unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_duration_rises_with_maturity() {
    let settlement = date(2025, 1, 15);
    let short = semi_annual(100.0, 0.05, date(2028, 1, 15));
    let long = semi_annual(100.0, 0.05, date(2045, 1, 15));

    let short_risk = risk_metrics(&short, 0.05, settlement).unwrap();
    let long_risk = risk_metrics(&long, 0.05, settlement).unwrap();
    assert!(long_risk.modified > short_risk.modified);
    assert!(long_risk.convexity > short_risk.convexity);
}

#[test]
fn test_yield_solve_reports_iteration_cap() {
    let bond = semi_annual(100.0, 0.05, date(2035, 1, 15));
    let settlement = date(2025, 1, 15);

    let capped = YieldSolver::new().with_max_iterations(3).solve(&bond, 60.0, settlement);
    match capped {
        Err(err @ BondlabError::ConvergenceError { iterations, .. }) => {
            assert_eq!(iterations, 3);
            assert!(err.is_retryable());
        }
        other => panic!("expected convergence error, got {other:?}"),
    }

    let y = yield_from_price(&bond, 60.0, settlement).unwrap();
    assert_relative_eq!(price_from_yield(&bond, y, settlement).unwrap(), 60.0, epsilon = 1e-6);
}

#[test]
fn test_convexity_improves_duration_estimate() {
    let bond = semi_annual(100.0, 0.04, date(2040, 5, 15));
    let settlement = date(2025, 5, 15);
    let metrics = risk_metrics(&bond, 0.05, settlement).unwrap();

    let base = price(&bond, 0.05, settlement).unwrap().dirty;
    let actual = price(&bond, 0.06, settlement).unwrap().dirty - base;
    let estimate = metrics.estimate_price_change(base, 0.01);
    let duration_only = -metrics.modified * base * 0.01;

    assert!((actual - estimate).abs() < (actual - duration_only).abs());
}

#[test]
fn test_bond_bootstrap_then_curve_pricing() {
    let settlement = date(2025, 4, 1);
    let quotes = vec![
        BondQuote::new(semi_annual(100.0, 0.040, date(2026, 4, 1)), 99.9, settlement).unwrap(),
        BondQuote::new(semi_annual(100.0, 0.041, date(2028, 4, 1)), 99.5, settlement).unwrap(),
        BondQuote::new(semi_annual(100.0, 0.043, date(2032, 4, 1)), 99.0, settlement).unwrap(),
    ];
    let curve = bootstrap_from_bonds(&quotes).unwrap();

    for quote in &quotes {
        let repriced = price_from_curve(quote.bond(), &curve, settlement).unwrap();
        assert_relative_eq!(repriced.clean, quote.clean_price(), epsilon = 1e-6);
    }
}

#[test]
fn test_lattice_bounds_callable_and_putable() {
    let curve = YieldCurve::new(
        vec![
            YieldCurvePoint::new(1.0, 0.035),
            YieldCurvePoint::new(5.0, 0.040),
            YieldCurvePoint::new(10.0, 0.045),
        ],
        CurveMethod::CubicSpline,
    )
    .unwrap();
    let settlement = date(2025, 9, 1);
    let base = FixedRateBond::new(
        100.0,
        0.045,
        date(2034, 9, 1),
        Frequency::SemiAnnual,
        DayCountConvention::Thirty360,
    )
    .unwrap();
    let schedule = vec![ExerciseEntry::new(date(2029, 9, 1), 100.0)];

    let pricer = LatticePricer::ho_lee(0.01).unwrap();
    let straight = price_from_curve(&Bond::from(base.clone()), &curve, settlement).unwrap();
    let callable = pricer
        .price(&Bond::callable(base.clone(), schedule.clone()).unwrap(), &curve, settlement)
        .unwrap();
    let putable = pricer
        .price(&Bond::putable(base, schedule).unwrap(), &curve, settlement)
        .unwrap();

    assert_relative_eq!(callable.option_free_dirty, straight.dirty, epsilon = 1e-9);
    assert!(callable.dirty_price <= straight.dirty);
    assert!(putable.dirty_price >= straight.dirty);
}

proptest! {
    #[test]
    fn prop_yield_round_trip(
        coupon in 0.0f64..0.12,
        y in 0.001f64..0.15,
        years in 1i32..30,
        day in 1u32..28,
    ) {
        let settlement = date(2025, 2, day);
        let bond = semi_annual(100.0, coupon, date(2025 + years, 8, 15));

        let clean = price_from_yield(&bond, y, settlement).unwrap();
        let solved = yield_from_price(&bond, clean, settlement).unwrap();
        prop_assert!((solved - y).abs() < 1e-6, "y {} solved {}", y, solved);
    }

    #[test]
    fn prop_dirty_is_clean_plus_accrued(
        coupon in 0.01f64..0.10,
        y in 0.01f64..0.10,
        month in 1u32..12,
    ) {
        let bond = semi_annual(1000.0, coupon, date(2031, 6, 15));
        let settlement = date(2025, month, 10);
        let result = price(&bond, y, settlement).unwrap();

        prop_assert!((result.dirty - result.clean - result.accrued).abs() < 1e-9);
        let accrued = accrued_interest(&bond, settlement).unwrap();
        prop_assert!((result.accrued - accrued).abs() < 1e-9);
    }
}
