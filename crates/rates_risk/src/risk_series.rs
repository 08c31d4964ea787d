//! Risk rows as tenor-ordered exposure series.
//!
//! Risk tables mix tenor columns with bookkeeping columns (`R`, `ID`,
//! `PricingTime`, ...). [`RiskSeries::from_fields`] keeps the tenor
//! exposures only, orders them by tenor and sums them into a DV01.

use rates_core::types::tenor::compare_labels;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Column names that never hold a tenor exposure (compared case-insensitively).
pub const EXCLUDED_KEYS: [&str; 6] = ["r", "pricingtime", "z", "rowtype", "id", "__typename"];

/// Exposures smaller than this are treated as absent.
pub const EXPOSURE_FLOOR: f64 = 1e-10;

/// Strips the `c_` column prefix used by cashflow risk tables.
pub fn normalize_key(key: &str) -> &str {
    key.strip_prefix("c_").unwrap_or(key)
}

/// `true` for bookkeeping columns.
pub fn is_excluded_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    EXCLUDED_KEYS.contains(&lower.as_str())
}

/// One tenor exposure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RiskExposure {
    /// Tenor label
    pub term: String,
    /// Exposure value
    pub exposure: f64,
}

/// Tenor-ordered exposures and their sum.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RiskSeries {
    /// Exposures ordered by tenor; unparsable labels last
    pub exposures: Vec<RiskExposure>,
    /// Sum of exposures
    pub dv01: f64,
}

impl RiskSeries {
    /// Builds a series from `(column, value)` pairs.
    ///
    /// Excluded columns, non-finite values and values below
    /// [`EXPOSURE_FLOOR`] in magnitude are dropped.
    ///
    /// ```
    /// use rates_risk::RiskSeries;
    ///
    /// let series = RiskSeries::from_fields([
    ///     ("ID", 1.0),
    ///     ("c_5Y", 2.0),
    ///     ("c_1Y", 1.5),
    ///     ("R", 400.0),
    ///     ("2Y", 0.0),
    /// ]);
    /// let terms: Vec<_> = series.exposures.iter().map(|e| e.term.as_str()).collect();
    /// assert_eq!(terms, vec!["1Y", "5Y"]);
    /// assert_eq!(series.dv01, 3.5);
    /// ```
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut exposures: Vec<RiskExposure> = fields
            .into_iter()
            .filter(|(key, value)| {
                !is_excluded_key(key) && value.is_finite() && value.abs() >= EXPOSURE_FLOOR
            })
            .map(|(key, value)| RiskExposure {
                term: normalize_key(key).to_string(),
                exposure: value,
            })
            .collect();
        exposures.sort_by(|a, b| compare_labels(&a.term, &b.term));
        let dv01 = exposures.iter().map(|e| e.exposure).sum();
        Self { exposures, dv01 }
    }

    /// `true` when no exposure survived filtering.
    pub fn is_empty(&self) -> bool {
        self.exposures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_keys_case_insensitive() {
        assert!(is_excluded_key("PricingTime"));
        assert!(is_excluded_key("__typename"));
        assert!(is_excluded_key("RowType"));
        assert!(!is_excluded_key("c_1Y"));
    }

    #[test]
    fn test_unparsable_labels_sorted_last() {
        let series = RiskSeries::from_fields([("zeta", 1.0), ("6M", 1.0), ("alpha", 1.0), ("1W", 1.0)]);
        let terms: Vec<_> = series.exposures.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["1W", "6M", "alpha", "zeta"]);
    }

    #[test]
    fn test_drops_tiny_and_non_finite() {
        let series = RiskSeries::from_fields([("1Y", 1e-12), ("2Y", f64::NAN), ("3Y", f64::INFINITY)]);
        assert!(series.is_empty());
        assert_eq!(series.dv01, 0.0);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("c_10Y"), "10Y");
        assert_eq!(normalize_key("10Y"), "10Y");
    }
}
