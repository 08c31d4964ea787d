//! Counterparty cashflow buckets.
//!
//! Payment dates are grouped into buckets whose width grows with distance
//! from today:
//!
//! | Days from today | Bucket | Key |
//! |-----------------|--------|-----|
//! | 0..=7 | day | `day:YYYY-MM-DD` |
//! | 8..=30 | week starting Monday | `week:YYYY-MM-DD` |
//! | 31..=365 | calendar month | `month:YYYY-MM` |
//! | 366..=3650 | calendar year | `year:YYYY` |
//! | beyond | five calendar years from today's year, up to +40 years | `5y:YYYY-YYYY` |
//!
//! Past dates and dates beyond the last five-year bucket are dropped.
//! Cashflows, weights and per-tenor risk are summed per bucket. The bucket
//! cashflows can then be repriced as a [`Valuation::Table`] keyed by bucket
//! key against [`bucket_risk_matrix`].

use std::collections::BTreeMap;

use rates_core::market_data::RateUnit;
use rates_core::types::tenor::compare_labels;
use rates_core::types::{Date, DateError};
use rates_core::RevalError;

use crate::revaluation::Valuation;
use crate::risk_series::{is_excluded_key, normalize_key};
use crate::sensitivity::SensitivityMatrix;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Years covered by five-year buckets past today's year.
pub const MAX_BUCKET_YEARS: i32 = 40;

/// Bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum BucketKind {
    /// Single day
    Day,
    /// Monday-start week
    Week,
    /// Calendar month
    Month,
    /// Calendar year
    Year,
    /// Five calendar years
    FiveYear,
}

/// Identity and extent of one bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BucketKey {
    /// Granularity
    pub kind: BucketKind,
    /// Stable key, e.g. `month:2025-03`
    pub key: String,
    /// Display label, e.g. `Week of 2025-01-13`
    pub label: String,
    /// First day of the bucket
    pub start: Date,
    /// Days from today to `start` (negative for a week starting before today)
    pub start_days: i64,
    /// Bucket width in days
    pub span_days: i64,
}

/// Bucket a payment date falls into, or `None` when it is dropped.
///
/// ```
/// use rates_core::types::Date;
/// use rates_risk::buckets::bucket_for_date;
///
/// let today = Date::from_ymd(2025, 1, 1).unwrap();
/// let b = bucket_for_date(Date::from_ymd(2025, 6, 17).unwrap(), today).unwrap().unwrap();
/// assert_eq!(b.key, "month:2025-06");
/// assert_eq!(b.span_days, 30);
/// ```
pub fn bucket_for_date(date: Date, today: Date) -> Result<Option<BucketKey>, DateError> {
    let diff = date - today;
    if diff < 0 {
        return Ok(None);
    }

    if diff <= 7 {
        return Ok(Some(BucketKey {
            kind: BucketKind::Day,
            key: format!("day:{}", date),
            label: date.to_string(),
            start: date,
            start_days: diff,
            span_days: 1,
        }));
    }

    if diff <= 30 {
        let start = date.start_of_week()?;
        return Ok(Some(BucketKey {
            kind: BucketKind::Week,
            key: format!("week:{}", start),
            label: format!("Week of {}", start),
            start,
            start_days: start - today,
            span_days: 7,
        }));
    }

    if diff <= 365 {
        let start = date.start_of_month()?;
        let next = start.add_months(1)?;
        let label = format!("{:04}-{:02}", start.year(), start.month());
        return Ok(Some(BucketKey {
            kind: BucketKind::Month,
            key: format!("month:{}", label),
            label,
            start,
            start_days: start - today,
            span_days: (next - start).max(28),
        }));
    }

    if diff <= 365 * 10 {
        let start = date.start_of_year()?;
        let next = Date::from_ymd(start.year() + 1, 1, 1)?;
        let label = start.year().to_string();
        return Ok(Some(BucketKey {
            kind: BucketKind::Year,
            key: format!("year:{}", label),
            label,
            start,
            start_days: start - today,
            span_days: next - start,
        }));
    }

    let base_year = today.year();
    if date.year() > base_year + MAX_BUCKET_YEARS {
        return Ok(None);
    }
    let offset = (date.year() - base_year).div_euclid(5);
    let start_year = base_year + offset * 5;
    let start = Date::from_ymd(start_year, 1, 1)?;
    let end = Date::from_ymd(start_year + 5, 1, 1)?;
    let label = format!("{}-{}", start_year, start_year + 4);
    Ok(Some(BucketKey {
        kind: BucketKind::FiveYear,
        key: format!("5y:{}", label),
        label,
        start,
        start_days: start - today,
        span_days: end - start,
    }))
}

/// Aggregated cashflow bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CashflowBucket {
    /// Bucket identity
    pub bucket: BucketKey,
    /// Sum of cashflows
    pub cashflow: f64,
    /// Sum of weights
    pub weight: f64,
    /// Tenor label → summed cashflow sensitivity
    pub risk: BTreeMap<String, f64>,
}

/// Accumulates cashflow and risk rows into buckets relative to `today`.
///
/// # Example
///
/// ```
/// use rates_core::types::Date;
/// use rates_risk::buckets::BucketAggregator;
///
/// let today = Date::from_ymd(2025, 1, 1).unwrap();
/// let mut agg = BucketAggregator::new(today);
/// agg.add_cashflow(Date::from_ymd(2025, 1, 2).unwrap(), 100.0, 1.0).unwrap();
/// agg.add_cashflow(Date::from_ymd(2025, 1, 2).unwrap(), 50.0, 0.5).unwrap();
/// agg.add_cashflow(Date::from_ymd(2024, 12, 31).unwrap(), 999.0, 1.0).unwrap();
///
/// let buckets = agg.finish();
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[0].cashflow, 150.0);
/// ```
#[derive(Debug, Clone)]
pub struct BucketAggregator {
    today: Date,
    buckets: BTreeMap<String, CashflowBucket>,
}

impl BucketAggregator {
    /// Starts an empty aggregation.
    pub fn new(today: Date) -> Self {
        Self {
            today,
            buckets: BTreeMap::new(),
        }
    }

    fn entry(&mut self, date: Date) -> Result<Option<&mut CashflowBucket>, DateError> {
        let bucket = match bucket_for_date(date, self.today)? {
            Some(b) => b,
            None => return Ok(None),
        };
        Ok(Some(
            self.buckets
                .entry(bucket.key.clone())
                .or_insert_with(|| CashflowBucket {
                    bucket,
                    cashflow: 0.0,
                    weight: 0.0,
                    risk: BTreeMap::new(),
                }),
        ))
    }

    /// Adds a cashflow paid on `date`. Returns `false` if it was dropped.
    pub fn add_cashflow(
        &mut self,
        date: Date,
        cashflow: f64,
        weight: f64,
    ) -> Result<bool, DateError> {
        Ok(match self.entry(date)? {
            Some(b) => {
                b.cashflow += cashflow;
                b.weight += weight;
                true
            }
            None => false,
        })
    }

    /// Adds per-tenor cashflow sensitivities for a payment on `date`.
    ///
    /// Bookkeeping columns and non-finite values are ignored; `c_` prefixes
    /// are stripped.
    pub fn add_risk<'a>(
        &mut self,
        date: Date,
        exposures: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<bool, DateError> {
        Ok(match self.entry(date)? {
            Some(b) => {
                for (key, value) in exposures {
                    if is_excluded_key(key) || !value.is_finite() {
                        continue;
                    }
                    *b.risk.entry(normalize_key(key).to_string()).or_insert(0.0) += value;
                }
                true
            }
            None => false,
        })
    }

    /// Buckets ordered by `start_days`.
    pub fn finish(self) -> Vec<CashflowBucket> {
        let mut out: Vec<CashflowBucket> = self.buckets.into_values().collect();
        out.sort_by_key(|b| b.bucket.start_days);
        out
    }
}

/// Bucket cashflows as a keyed table.
pub fn bucket_table(buckets: &[CashflowBucket]) -> Valuation {
    Valuation::Table(
        buckets
            .iter()
            .map(|b| (b.bucket.key.clone(), b.cashflow))
            .collect(),
    )
}

/// Sensitivity matrix with one row per bucket key.
///
/// Columns are the union of bucket risk tenors, ordered by tenor. Buckets
/// without risk get a zero row.
pub fn bucket_risk_matrix(
    buckets: &[CashflowBucket],
    unit: RateUnit,
) -> Result<SensitivityMatrix, RevalError> {
    let mut columns: Vec<String> = buckets
        .iter()
        .flat_map(|b| b.risk.keys().cloned())
        .collect();
    columns.sort_by(|a, b| compare_labels(a, b));
    columns.dedup();

    let rows = buckets
        .iter()
        .map(|b| {
            columns
                .iter()
                .map(|c| b.risk.get(c).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    let keys = buckets.iter().map(|b| b.bucket.key.clone()).collect();
    SensitivityMatrix::new(keys, columns, unit, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revaluation::{reprice, ChangeVector};
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    // Wednesday
    fn today() -> Date {
        d(2025, 1, 1)
    }

    #[test]
    fn test_daily_boundary() {
        let b = bucket_for_date(d(2025, 1, 8), today()).unwrap().unwrap();
        assert_eq!(b.kind, BucketKind::Day);
        assert_eq!(b.key, "day:2025-01-08");
        assert_eq!(b.start_days, 7);

        assert!(bucket_for_date(d(2024, 12, 31), today()).unwrap().is_none());
    }

    #[test]
    fn test_weekly_starts_monday() {
        let b = bucket_for_date(d(2025, 1, 9), today()).unwrap().unwrap();
        assert_eq!(b.kind, BucketKind::Week);
        assert_eq!(b.key, "week:2025-01-06");
        assert_eq!(b.label, "Week of 2025-01-06");
        assert_eq!(b.start_days, 5);
        assert_eq!(b.span_days, 7);

        let b = bucket_for_date(d(2025, 1, 31), today()).unwrap().unwrap();
        assert_eq!(b.kind, BucketKind::Week);
    }

    #[test]
    fn test_monthly_span() {
        let b = bucket_for_date(d(2025, 2, 14), today()).unwrap().unwrap();
        assert_eq!(b.key, "month:2025-02");
        assert_eq!(b.label, "2025-02");
        assert_eq!(b.span_days, 28);
        assert_eq!(b.start_days, 31);
    }

    #[test]
    fn test_yearly_and_five_year() {
        let b = bucket_for_date(d(2028, 7, 1), today()).unwrap().unwrap();
        assert_eq!(b.key, "year:2028");
        assert_eq!(b.span_days, 366);

        let b = bucket_for_date(d(2037, 3, 1), today()).unwrap().unwrap();
        assert_eq!(b.kind, BucketKind::FiveYear);
        assert_eq!(b.key, "5y:2035-2039");
        assert_eq!(b.start, d(2035, 1, 1));

        assert!(bucket_for_date(d(2066, 1, 1), today()).unwrap().is_none());
        assert!(bucket_for_date(d(2065, 12, 31), today()).unwrap().is_some());
    }

    #[test]
    fn test_aggregate_and_reprice() {
        let mut agg = BucketAggregator::new(today());
        agg.add_cashflow(d(2025, 6, 3), 1000.0, 1.0).unwrap();
        agg.add_cashflow(d(2025, 6, 20), 500.0, 2.0).unwrap();
        agg.add_cashflow(d(2030, 1, 1), 200.0, 1.0).unwrap();
        agg.add_risk(d(2025, 6, 3), [("c_1Y", 10.0), ("ID", 5.0), ("c_2Y", f64::NAN)])
            .unwrap();
        agg.add_risk(d(2025, 6, 20), [("c_1Y", 5.0), ("c_5Y", 1.0)]).unwrap();

        let buckets = agg.finish();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket.key, "month:2025-06");
        assert_eq!(buckets[0].cashflow, 1500.0);
        assert_eq!(buckets[0].weight, 3.0);
        assert_eq!(buckets[0].risk.get("1Y"), Some(&15.0));
        assert!(!buckets[0].risk.contains_key("ID"));

        let matrix = bucket_risk_matrix(&buckets, RateUnit::BasisPoints).unwrap();
        assert_eq!(matrix.columns(), &["1Y".to_string(), "5Y".to_string()]);

        let change = ChangeVector::from_pairs([("1Y", 0.0001), ("5Y", -0.0002)]);
        let out = reprice(&bucket_table(&buckets), Some(&matrix), &change).unwrap();
        let values = out.values();
        assert_relative_eq!(values[0], 1500.0 + 15.0 - 2.0, epsilon = 1e-9);
        assert_eq!(values[1], 200.0);
    }
}
