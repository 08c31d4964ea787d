//! Benchmark term structures: ordered tenor → rate data.
//!
//! A [`TermStructure`] is the market-data baseline the revaluation engine
//! diffs against. Labels are unique and points are kept sorted by tenor
//! year fraction so that neighbour logic (simulator bands) and matrix column
//! order agree.

use serde::{Deserialize, Serialize};

use crate::types::error::TenorError;
use crate::types::tenor::Tenor;

/// Unit in which rates (or rate changes) are expressed.
///
/// The engine's canonical unit is [`RateUnit::Decimal`] (0.053 = 5.3%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    /// Decimal rates: 0.053
    #[default]
    Decimal,
    /// Percentage points: 5.3
    Percent,
    /// Basis points: 530
    #[serde(rename = "bps")]
    BasisPoints,
}

impl RateUnit {
    /// Number of units in one decimal rate unit.
    ///
    /// ```
    /// use rates_core::market_data::RateUnit;
    ///
    /// assert_eq!(RateUnit::Decimal.per_decimal(), 1.0);
    /// assert_eq!(RateUnit::Percent.per_decimal(), 100.0);
    /// assert_eq!(RateUnit::BasisPoints.per_decimal(), 10_000.0);
    /// ```
    #[inline]
    pub fn per_decimal(&self) -> f64 {
        match self {
            RateUnit::Decimal => 1.0,
            RateUnit::Percent => 100.0,
            RateUnit::BasisPoints => 10_000.0,
        }
    }

    /// Size of one basis point expressed in this unit.
    #[inline]
    pub fn basis_point(&self) -> f64 {
        self.per_decimal() / 10_000.0
    }

    /// Converts `value` from this unit into `target`.
    #[inline]
    pub fn convert(&self, value: f64, target: RateUnit) -> f64 {
        value / self.per_decimal() * target.per_decimal()
    }
}

/// One (tenor, rate) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermPoint {
    /// Maturity label
    pub tenor: Tenor,
    /// Quoted rate in the structure's unit
    pub rate: f64,
}

#[derive(Deserialize)]
struct TermStructureRepr {
    points: Vec<TermPoint>,
    #[serde(default)]
    unit: RateUnit,
}

/// Ordered sequence of (tenor, rate) pairs.
///
/// # Invariants
///
/// - Tenor labels are unique
/// - Points are sorted by tenor year fraction (stable for equal fractions)
///
/// # Examples
///
/// ```
/// use rates_core::market_data::TermStructure;
///
/// let curve = TermStructure::from_labels(&[("5Y", 0.07), ("1Y", 0.05), ("2Y", 0.06)]).unwrap();
/// assert_eq!(curve.labels(), vec!["1Y", "2Y", "5Y"]);
/// assert_eq!(curve.rate_of("2Y").unwrap(), Some(0.06));
///
/// assert!(TermStructure::from_labels(&[("1Y", 0.05), ("1Y", 0.06)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermStructureRepr")]
pub struct TermStructure {
    points: Vec<TermPoint>,
    unit: RateUnit,
}

impl TermStructure {
    /// Builds a decimal-unit term structure from parsed tenors.
    pub fn new(points: Vec<(Tenor, f64)>) -> Result<Self, TenorError> {
        Self::with_unit(points, RateUnit::Decimal)
    }

    /// Builds a term structure whose rates are expressed in `unit`.
    pub fn with_unit(points: Vec<(Tenor, f64)>, unit: RateUnit) -> Result<Self, TenorError> {
        let mut out: Vec<TermPoint> = Vec::with_capacity(points.len());
        for (tenor, rate) in points {
            if out.iter().any(|p| p.tenor == tenor) {
                return Err(TenorError::Duplicate {
                    label: tenor.to_string(),
                });
            }
            out.push(TermPoint { tenor, rate });
        }
        out.sort_by(|a, b| a.tenor.cmp_by_years(&b.tenor));
        Ok(Self { points: out, unit })
    }

    /// Parses labels and builds a decimal-unit term structure.
    pub fn from_labels(points: &[(&str, f64)]) -> Result<Self, TenorError> {
        let parsed = points
            .iter()
            .map(|(label, rate)| Ok((label.parse::<Tenor>()?, *rate)))
            .collect::<Result<Vec<_>, TenorError>>()?;
        Self::new(parsed)
    }

    /// Parses labels quoted in percent and stores them as decimals.
    ///
    /// ```
    /// use rates_core::market_data::{RateUnit, TermStructure};
    ///
    /// let curve = TermStructure::from_percent(&[("1W", 5.309)]).unwrap();
    /// assert_eq!(curve.unit(), RateUnit::Decimal);
    /// assert!((curve.rates()[0] - 0.05309).abs() < 1e-15);
    /// ```
    pub fn from_percent(points: &[(&str, f64)]) -> Result<Self, TenorError> {
        let decimals: Vec<(&str, f64)> = points.iter().map(|(l, r)| (*l, r / 100.0)).collect();
        Self::from_labels(&decimals)
    }

    /// Returns a copy with every rate converted into `target`.
    pub fn to_unit(&self, target: RateUnit) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| TermPoint {
                    tenor: p.tenor,
                    rate: self.unit.convert(p.rate, target),
                })
                .collect(),
            unit: target,
        }
    }

    /// Unit of the stored rates.
    #[inline]
    pub fn unit(&self) -> RateUnit {
        self.unit
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the structure has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in tenor order.
    #[inline]
    pub fn points(&self) -> &[TermPoint] {
        &self.points
    }

    /// Iterates over points in tenor order.
    pub fn iter(&self) -> impl Iterator<Item = &TermPoint> {
        self.points.iter()
    }

    /// Tenors in order.
    pub fn tenors(&self) -> Vec<Tenor> {
        self.points.iter().map(|p| p.tenor).collect()
    }

    /// Tenor labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.tenor.to_string()).collect()
    }

    /// Rates in order.
    pub fn rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.rate).collect()
    }

    /// Position of `tenor`, if present.
    pub fn index_of(&self, tenor: &Tenor) -> Option<usize> {
        self.points.iter().position(|p| p.tenor == *tenor)
    }

    /// Rate for `tenor`, if present.
    pub fn rate(&self, tenor: &Tenor) -> Option<f64> {
        self.index_of(tenor).map(|i| self.points[i].rate)
    }

    /// Rate for a label; fails only when the label cannot be parsed.
    pub fn rate_of(&self, label: &str) -> Result<Option<f64>, TenorError> {
        let tenor: Tenor = label.parse()?;
        Ok(self.rate(&tenor))
    }

    /// Overwrites the rate at `index`.
    ///
    /// Returns the previous rate, or `None` when `index` is out of range.
    pub fn set_rate_at(&mut self, index: usize, rate: f64) -> Option<f64> {
        self.points
            .get_mut(index)
            .map(|p| std::mem::replace(&mut p.rate, rate))
    }

    /// Overwrites the rate of an existing tenor.
    pub fn set_rate(&mut self, tenor: &Tenor, rate: f64) -> Result<f64, TenorError> {
        let index = self.index_of(tenor).ok_or_else(|| TenorError::NotFound {
            label: tenor.to_string(),
        })?;
        self.set_rate_at(index, rate)
            .ok_or_else(|| TenorError::NotFound {
                label: tenor.to_string(),
            })
    }
}

impl TryFrom<TermStructureRepr> for TermStructure {
    type Error = TenorError;

    fn try_from(repr: TermStructureRepr) -> Result<Self, Self::Error> {
        Self::with_unit(
            repr.points.into_iter().map(|p| (p.tenor, p.rate)).collect(),
            repr.unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sorted_by_year_fraction() {
        let curve =
            TermStructure::from_labels(&[("2Y", 0.04), ("1W", 0.05), ("18M", 0.045), ("3M", 0.052)])
                .unwrap();
        assert_eq!(curve.labels(), vec!["1W", "3M", "18M", "2Y"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06), ("1Y", 0.07)]);
        assert_eq!(
            err,
            Err(TenorError::Duplicate {
                label: "1Y".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(matches!(
            TermStructure::from_labels(&[("1Q", 0.05)]),
            Err(TenorError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_set_rate() {
        let mut curve = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06)]).unwrap();
        let two_y: Tenor = "2Y".parse().unwrap();
        assert_eq!(curve.set_rate(&two_y, 0.061).unwrap(), 0.06);
        assert_eq!(curve.rate(&two_y), Some(0.061));

        let ten_y: Tenor = "10Y".parse().unwrap();
        assert!(matches!(
            curve.set_rate(&ten_y, 0.01),
            Err(TenorError::NotFound { .. })
        ));
        assert_eq!(curve.set_rate_at(7, 0.01), None);
    }

    #[test]
    fn test_unit_conversion() {
        let curve = TermStructure::from_labels(&[("1Y", 0.05)]).unwrap();
        let pct = curve.to_unit(RateUnit::Percent);
        assert_eq!(pct.unit(), RateUnit::Percent);
        assert_relative_eq!(pct.rates()[0], 5.0);
        assert_relative_eq!(RateUnit::Percent.basis_point(), 0.01);
        assert_relative_eq!(RateUnit::Decimal.basis_point(), 0.0001);
        assert_relative_eq!(RateUnit::BasisPoints.convert(25.0, RateUnit::Decimal), 0.0025);
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let json = r#"{"points":[{"tenor":"2Y","rate":0.06},{"tenor":"1Y","rate":0.05}]}"#;
        let curve: TermStructure = serde_json::from_str(json).unwrap();
        assert_eq!(curve.labels(), vec!["1Y", "2Y"]);
        assert_eq!(curve.unit(), RateUnit::Decimal);

        let dup = r#"{"points":[{"tenor":"1Y","rate":0.06},{"tenor":"1Y","rate":0.05}]}"#;
        assert!(serde_json::from_str::<TermStructure>(dup).is_err());
    }
}
