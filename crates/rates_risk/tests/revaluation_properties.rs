//! Acceptance scenarios and algebraic properties of `reprice`.

use approx::assert_relative_eq;
use proptest::prelude::*;
use rates_core::market_data::{RateUnit, TermStructure};
use rates_risk::{par_rate, reprice, reprice_swap, ChangeVector, SensitivityMatrix, Valuation};

const TENORS: [&str; 4] = ["1Y", "2Y", "5Y", "10Y"];

fn labels() -> Vec<String> {
    TENORS.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_npv_scenario_through_term_structures() {
    let baseline =
        TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06), ("5Y", 0.07)]).unwrap();
    let shocked =
        TermStructure::from_labels(&[("1Y", 0.051), ("2Y", 0.06), ("5Y", 0.0695)]).unwrap();
    let change = ChangeVector::diff(&baseline, &shocked);

    let matrix = SensitivityMatrix::new(
        vec!["npv".into()],
        baseline.labels(),
        RateUnit::Decimal,
        vec![vec![100.0, 200.0, 50.0]],
    )
    .unwrap();

    let out = reprice(&Valuation::Scalar(1000.0), Some(&matrix), &change).unwrap();
    assert_relative_eq!(out.as_scalar().unwrap(), 1000.075, epsilon = 1e-9);
}

#[test]
fn test_zero_fixed_rate_risk_never_nan() {
    let matrix = SensitivityMatrix::new(
        vec!["npv".into()],
        labels(),
        RateUnit::Decimal,
        vec![vec![1.0, 2.0, 3.0, 4.0]],
    )
    .unwrap();
    let change = ChangeVector::from_pairs([("1Y", 0.01), ("10Y", -0.02)]);
    for npv in [0.0, 1.0, -1e6] {
        let out = reprice_swap(npv, 0.03, 0.0, Some(&matrix), &change).unwrap();
        assert!(out.npv.is_finite());
        assert!(out.par_rate.is_finite());
    }
    assert!(par_rate(0.03, 0.0, 0.0).is_finite());
}

#[test]
fn test_shape_error_leaves_baseline_untouched() {
    let matrix = SensitivityMatrix::new(
        vec!["a".into(), "b".into()],
        labels(),
        RateUnit::Decimal,
        vec![vec![1.0; 4], vec![2.0; 4]],
    )
    .unwrap();
    let baseline = Valuation::Vector(vec![1.0, 2.0, 3.0]);
    let snapshot = baseline.clone();
    let change = ChangeVector::from_pairs([("1Y", 0.01)]);
    assert!(reprice(&baseline, Some(&matrix), &change).is_err());
    assert_eq!(baseline, snapshot);
}

fn matrix_strategy() -> impl Strategy<Value = SensitivityMatrix> {
    (1usize..6).prop_flat_map(|rows| {
        prop::collection::vec(prop::collection::vec(-1e4f64..1e4, 4), rows).prop_map(
            move |data| {
                let keys = (0..rows).map(|i| format!("row{}", i)).collect();
                SensitivityMatrix::new(keys, labels(), RateUnit::Decimal, data).unwrap()
            },
        )
    })
}

fn change_strategy() -> impl Strategy<Value = ChangeVector> {
    prop::collection::vec(-0.01f64..0.01, 4)
        .prop_map(|d| ChangeVector::new(labels(), d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_zero_shock_is_noop(matrix in matrix_strategy(), base in -1e6f64..1e6) {
        let baseline = Valuation::Vector(vec![base; matrix.n_rows()]);
        let zero = ChangeVector::zeros(labels());
        let out = reprice(&baseline, Some(&matrix), &zero).unwrap();
        prop_assert_eq!(out, baseline);
    }

    #[test]
    fn prop_linear_in_change(
        matrix in matrix_strategy(),
        v1 in change_strategy(),
        v2 in change_strategy(),
        a in -5.0f64..5.0,
    ) {
        let n = matrix.n_rows();
        let baseline = Valuation::Vector((0..n).map(|i| i as f64 * 10.0).collect());
        let zero = Valuation::Vector(vec![0.0; n]);

        let combined = v1.scale(a).combine(&v2).unwrap();
        let lhs = reprice(&baseline, Some(&matrix), &combined).unwrap().values();
        let m1 = reprice(&zero, Some(&matrix), &v1).unwrap().values();
        let m2 = reprice(&zero, Some(&matrix), &v2).unwrap().values();
        let base = baseline.values();

        for i in 0..n {
            let rhs = base[i] + a * m1[i] + m2[i];
            prop_assert!((lhs[i] - rhs).abs() <= 1e-9 * (1.0 + rhs.abs()));
        }
    }
}
