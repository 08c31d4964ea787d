//! Property tests for term structure ordering and lookups.

use proptest::prelude::*;
use rates_core::market_data::{RateUnit, TermStructure};
use rates_core::types::Tenor;

const LABELS: [&str; 12] = [
    "1W", "2W", "1M", "3M", "6M", "9M", "1Y", "18M", "2Y", "5Y", "10Y", "30Y",
];

fn shuffled_points() -> impl Strategy<Value = Vec<(&'static str, f64)>> {
    (
        Just(LABELS.to_vec()).prop_shuffle(),
        1usize..=LABELS.len(),
        prop::collection::vec(0.0f64..0.1, LABELS.len()),
    )
        .prop_map(|(labels, take, rates)| {
            labels.into_iter().take(take).zip(rates).collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_points_sorted_by_year_fraction(points in shuffled_points()) {
        let curve = TermStructure::from_labels(&points).unwrap();
        prop_assert_eq!(curve.len(), points.len());

        let years: Vec<f64> = curve.tenors().iter().map(Tenor::years).collect();
        for pair in years.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_rates_follow_their_labels(points in shuffled_points()) {
        let curve = TermStructure::from_labels(&points).unwrap();
        for (label, rate) in &points {
            let tenor: Tenor = label.parse().unwrap();
            prop_assert_eq!(curve.rate(&tenor), Some(*rate));
        }
    }

    #[test]
    fn prop_percent_quotes_match_decimal(points in shuffled_points()) {
        let percent: Vec<(&str, f64)> = points.iter().map(|(l, r)| (*l, r * 100.0)).collect();
        let from_percent = TermStructure::from_percent(&percent).unwrap();
        let decimal = TermStructure::from_labels(&points).unwrap();

        prop_assert_eq!(from_percent.unit(), RateUnit::Decimal);
        prop_assert_eq!(from_percent.labels(), decimal.labels());
        for (a, b) in from_percent.rates().iter().zip(decimal.rates()) {
            prop_assert!((a - b).abs() < 1e-15);
        }
    }
}
