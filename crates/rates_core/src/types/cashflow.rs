//! Cashflow and fixing table rows.
//!
//! Rows are produced by an external swap pricer and mutated in place when a
//! market shock is applied. Rates are decimals (0.053 = 5.3%).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::Date;

/// Swap leg selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leg {
    /// Fixed-rate leg
    Fixed,
    /// Floating-rate leg
    Float,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Fixed => f.write_str("fixed"),
            Leg::Float => f.write_str("float"),
        }
    }
}

/// One row of a leg's cashflow schedule.
///
/// The notional is signed: negative for a paid leg, positive for a received
/// leg, so `cashflow = notional * rate * accrual_fraction` and
/// `npv = cashflow * discount_factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowRow {
    /// Accrual period start
    pub accrual_start: Date,
    /// Accrual period end
    pub accrual_end: Date,
    /// Payment date
    pub payment_date: Date,
    /// Accrual fraction under the leg's day count
    pub accrual_fraction: f64,
    /// Signed notional
    pub notional: f64,
    /// Discount factor to the payment date
    pub discount_factor: f64,
    /// Period rate (fixed rate or projected floating rate)
    pub rate: f64,
    /// Cashflow amount
    pub cashflow: f64,
    /// Present value of the cashflow
    pub npv: f64,
}

impl CashflowRow {
    /// Replaces the discount factor and rate, recomputing amount and NPV.
    ///
    /// ```
    /// use rates_core::types::{CashflowRow, Date};
    ///
    /// let d = Date::from_ymd(2025, 1, 1).unwrap();
    /// let mut row = CashflowRow {
    ///     accrual_start: d,
    ///     accrual_end: d,
    ///     payment_date: d,
    ///     accrual_fraction: 0.5,
    ///     notional: -1_000_000.0,
    ///     discount_factor: 0.98,
    ///     rate: 0.04,
    ///     cashflow: -20_000.0,
    ///     npv: -19_600.0,
    /// };
    /// row.reprice(0.97, 0.05);
    /// assert!((row.cashflow + 25_000.0).abs() < 1e-9);
    /// assert!((row.npv + 24_250.0).abs() < 1e-9);
    /// ```
    pub fn reprice(&mut self, discount_factor: f64, rate: f64) {
        self.discount_factor = discount_factor;
        self.rate = rate;
        self.cashflow = self.notional * rate * self.accrual_fraction;
        self.npv = self.cashflow * discount_factor;
    }
}

/// Sum of row NPVs.
pub fn total_npv(rows: &[CashflowRow]) -> f64 {
    rows.iter().map(|r| r.npv).sum()
}

/// One observation of a floating period's fixing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixingRow {
    /// Observation (fixing) date
    pub observation_date: Date,
    /// Accrual fraction of the observation
    pub accrual_fraction: f64,
    /// Notional required to hedge this observation
    pub hedging_notional: f64,
    /// Published fixing for historical dates, projected rate otherwise
    pub rate: f64,
    /// Risk weight of the observation
    pub risk: f64,
}

impl FixingRow {
    /// Returns `true` when the observation is on or after `valuation_date`
    /// and therefore still sensitive to the curve.
    pub fn is_unfixed(&self, valuation_date: Date) -> bool {
        self.observation_date >= valuation_date
    }
}

/// Historical fixings of a floating-rate index, sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixingSeries {
    observations: Vec<(Date, f64)>,
}

impl FixingSeries {
    /// Builds a series, sorting by date and keeping the last value for a
    /// repeated date.
    pub fn new(mut observations: Vec<(Date, f64)>) -> Self {
        observations.sort_by_key(|(d, _)| *d);
        let mut deduped: Vec<(Date, f64)> = Vec::with_capacity(observations.len());
        for (date, value) in observations {
            match deduped.last_mut() {
                Some(last) if last.0 == date => last.1 = value,
                _ => deduped.push((date, value)),
            }
        }
        Self {
            observations: deduped,
        }
    }

    /// Observations strictly before `valuation_date`.
    ///
    /// Only published fixings are meaningful to an instrument; anything on
    /// or after the valuation date must be projected from the curve.
    pub fn before(&self, valuation_date: Date) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .copied()
                .filter(|(d, _)| *d < valuation_date)
                .collect(),
        }
    }

    /// Fixing published on `date`, if any.
    pub fn get(&self, date: Date) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.observations[i].1)
    }

    /// Iterates over (date, value) pairs.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(Date, f64)> {
        self.observations.iter()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_fixing_series_sorted_and_deduplicated() {
        let series = FixingSeries::new(vec![
            (d(2024, 3, 3), 0.0531),
            (d(2024, 3, 1), 0.0530),
            (d(2024, 3, 3), 0.0532),
        ]);
        let dates: Vec<Date> = series.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, vec![d(2024, 3, 1), d(2024, 3, 3)]);
        assert_eq!(series.get(d(2024, 3, 3)), Some(0.0532));
        assert_eq!(series.get(d(2024, 3, 2)), None);
    }

    #[test]
    fn test_fixing_series_before_valuation() {
        let series = FixingSeries::new(vec![
            (d(2024, 3, 1), 0.0530),
            (d(2024, 3, 4), 0.0531),
            (d(2024, 3, 5), 0.0533),
        ]);
        let hist = series.before(d(2024, 3, 4));
        assert_eq!(hist.len(), 1);
        assert!(series.before(d(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_unfixed_boundary() {
        let row = FixingRow {
            observation_date: d(2024, 3, 4),
            accrual_fraction: 1.0 / 360.0,
            hedging_notional: 1.0e6,
            rate: 0.053,
            risk: 0.0,
        };
        assert!(row.is_unfixed(d(2024, 3, 4)));
        assert!(!row.is_unfixed(d(2024, 3, 5)));
    }

    #[test]
    fn test_total_npv() {
        let base = CashflowRow {
            accrual_start: d(2024, 1, 1),
            accrual_end: d(2025, 1, 1),
            payment_date: d(2025, 1, 3),
            accrual_fraction: 1.0,
            notional: 100.0,
            discount_factor: 0.95,
            rate: 0.05,
            cashflow: 5.0,
            npv: 4.75,
        };
        let rows = vec![base.clone(), base];
        assert!((total_npv(&rows) - 9.5).abs() < 1e-12);
    }
}
