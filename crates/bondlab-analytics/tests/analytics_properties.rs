//! Integration tests: spreads against bootstrapped curves, structured
//! product properties and configured analysis runs.

use approx::assert_relative_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;

use bondlab_analytics::prelude::*;
use bondlab_analytics::structured::{TranchePayment, WaterfallResult};
use bondlab_bonds::bond::{Bond, ExerciseEntry, FixedRateBond};
use bondlab_bonds::pricing::{bootstrap_from_bonds, price_from_curve_with_spread, BondQuote};
use bondlab_core::daycounts::DayCountConvention;
use bondlab_core::types::{BasisPoints, Date, Frequency, Percentage};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn semi_annual(coupon: f64, maturity: Date) -> FixedRateBond {
    FixedRateBond::new(
        100.0,
        coupon,
        maturity,
        Frequency::SemiAnnual,
        DayCountConvention::Thirty360,
    )
    .unwrap()
}

#[test]
fn test_z_spread_zero_on_bootstrapped_curve() {
    let settlement = date(2025, 3, 3);
    let quotes = vec![
        BondQuote::new(semi_annual(0.040, date(2026, 3, 3)).into(), 99.95, settlement).unwrap(),
        BondQuote::new(semi_annual(0.041, date(2028, 3, 3)).into(), 99.60, settlement).unwrap(),
        BondQuote::new(semi_annual(0.043, date(2030, 3, 3)).into(), 99.20, settlement).unwrap(),
        BondQuote::new(semi_annual(0.045, date(2035, 3, 3)).into(), 98.70, settlement).unwrap(),
    ];
    let curve = bootstrap_from_bonds(&quotes).unwrap();

    for quote in &quotes {
        let spread = z_spread(quote.bond(), &curve, quote.clean_price(), settlement).unwrap();
        assert!(spread.value().abs() < 1e-4, "{}", spread);
    }
}

#[test]
fn test_oas_round_trip_through_analyzer() {
    let analyzer = BondAnalyzer::from_toml_str(
        r#"
        [lattice]
        volatility = 0.008
        steps_per_period = 6
        "#,
    )
    .unwrap();
    let settlement = date(2025, 10, 15);
    let curve = bondlab_curves::YieldCurve::new(
        vec![
            bondlab_curves::YieldCurvePoint::new(1.0, 0.037),
            bondlab_curves::YieldCurvePoint::new(5.0, 0.041),
            bondlab_curves::YieldCurvePoint::new(10.0, 0.044),
        ],
        bondlab_curves::CurveMethod::CubicSpline,
    )
    .unwrap();
    let bond = Bond::callable(
        semi_annual(0.052, date(2035, 10, 15)),
        vec![
            ExerciseEntry::new(date(2029, 10, 15), 101.0),
            ExerciseEntry::new(date(2031, 10, 15), 100.0),
        ],
    )
    .unwrap();

    let quoted = analyzer
        .lattice_pricer()
        .unwrap()
        .price_with_shift(&bond, &curve, settlement, 0.0065)
        .unwrap();
    let analysis = analyzer.analyze(&bond, &curve, quoted.clean_price, settlement).unwrap();

    let oas = analysis.oas.unwrap();
    assert_relative_eq!(oas.oas.value(), 65.0, epsilon = 1e-4);
    assert!(oas.z_spread.value() > oas.oas.value());
    let lattice = analysis.lattice.unwrap();
    assert_relative_eq!(lattice.clean_price, quoted.clean_price, epsilon = 1e-8);
}

#[test]
fn test_analyze_many_preserves_order() {
    let analyzer = BondAnalyzer::default();
    let settlement = date(2025, 1, 15);
    let curve = bondlab_curves::YieldCurve::new(
        vec![
            bondlab_curves::YieldCurvePoint::new(1.0, 0.04),
            bondlab_curves::YieldCurvePoint::new(10.0, 0.045),
        ],
        bondlab_curves::CurveMethod::Linear,
    )
    .unwrap();
    let quotes: Vec<(Bond, f64)> = [0.005, 0.01, 0.02]
        .iter()
        .map(|&s| {
            let bond: Bond = semi_annual(0.045, date(2032, 1, 15)).into();
            let clean = price_from_curve_with_spread(&bond, &curve, settlement, s).unwrap().clean;
            (bond, clean)
        })
        .collect();

    let results = analyzer.analyze_many(&quotes, &curve, settlement);
    let spreads: Vec<f64> = results.iter().map(|r| r.as_ref().unwrap().z_spread.value()).collect();
    assert_relative_eq!(spreads[0], 50.0, epsilon = 1e-5);
    assert_relative_eq!(spreads[1], 100.0, epsilon = 1e-5);
    assert_relative_eq!(spreads[2], 200.0, epsilon = 1e-5);
}

#[test]
fn test_analysis_and_waterfall_serialize() {
    let settlement = date(2025, 1, 15);
    let curve = bondlab_curves::YieldCurve::new(
        vec![
            bondlab_curves::YieldCurvePoint::new(1.0, 0.04),
            bondlab_curves::YieldCurvePoint::new(10.0, 0.045),
        ],
        bondlab_curves::CurveMethod::Linear,
    )
    .unwrap();
    let bond: Bond = semi_annual(0.045, date(2032, 1, 15)).into();
    let clean = price_from_curve_with_spread(&bond, &curve, settlement, 0.015).unwrap().clean;

    let analysis = BondAnalyzer::default().analyze(&bond, &curve, clean, settlement).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    assert_relative_eq!(json["z_spread"].as_f64().unwrap(), 150.0, epsilon = 1e-5);
    assert!(json["oas"].is_null());
    assert_eq!(json["key_rates"].as_array().unwrap().len(), 2);

    let tranches = vec![
        Tranche::new("A", Decimal::from(500), Decimal::new(5, 2), 1).unwrap(),
        Tranche::new("B", Decimal::from(200), Decimal::new(8, 2), 2).unwrap(),
    ];
    let result = abs_waterfall(tranches, Decimal::from(600)).unwrap();
    let restored: WaterfallResult =
        serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
    assert_eq!(restored, result);
}

#[test]
fn test_credit_from_z_spread() {
    let decomposition =
        decompose_credit_spread(BasisPoints::new(180.0).unwrap(), 0.4, 7.0, Some(0.01)).unwrap();

    assert_relative_eq!(decomposition.hazard_rate, 0.03, epsilon = 1e-12);
    assert_relative_eq!(
        decomposition.default_probability + decomposition.survival_probability,
        1.0
    );
    assert_relative_eq!(decomposition.risk_premium.unwrap().value(), 120.0, epsilon = 1e-9);
}

#[test]
fn test_psa_reference_points() {
    let full = Percentage::new(100.0).unwrap();
    assert_relative_eq!(psa(30, full).unwrap().value(), 6.0, epsilon = 1e-12);
    assert_relative_eq!(psa(15, full).unwrap().value(), 3.0, epsilon = 1e-12);
}

fn tranche_strategy() -> impl Strategy<Value = Vec<Tranche>> {
    proptest::collection::vec((0u32..10_000, 0u32..1_500), 1..6).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (size, rate_bp))| {
                Tranche::new(
                    format!("T{i}"),
                    Decimal::from(size),
                    Decimal::new(i64::from(rate_bp), 4),
                    u32::try_from(i).unwrap() + 1,
                )
                .unwrap()
            })
            .collect()
    })
}

fn assert_seniority(result: &WaterfallResult) -> Result<(), TestCaseError> {
    let first_short = result
        .payments
        .iter()
        .position(|p: &TranchePayment| !p.is_paid_in_full());
    if let Some(index) = first_short {
        prop_assert_eq!(result.residual, Decimal::ZERO);
        for junior in &result.payments[index + 1..] {
            prop_assert_eq!(junior.total_paid(), Decimal::ZERO);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_psa_ramp_is_monotonic_then_flat(month in 1u32..360, speed in 0.0f64..800.0) {
        let speed = Percentage::new(speed).unwrap();
        let here = psa(month, speed).unwrap().value();
        let next = psa(month + 1, speed).unwrap().value();

        prop_assert!(next >= here);
        if month >= 30 {
            prop_assert_eq!(next, here);
        }
    }

    #[test]
    fn prop_waterfall_conserves_cash(tranches in tranche_strategy(), cash in 0u32..50_000) {
        let cash = Decimal::from(cash);
        let result = abs_waterfall(tranches, cash).unwrap();

        prop_assert_eq!(result.total_paid() + result.residual, cash);
        prop_assert!(result.total_paid() <= cash);
        assert_seniority(&result)?;
    }
}
