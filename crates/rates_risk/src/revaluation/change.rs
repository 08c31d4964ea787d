//! Change vectors: current − baseline market quotes.
//!
//! A [`ChangeVector`] is always held in decimal-rate units. It is rescaled
//! into a matrix's unit and reordered into its columns only at the moment
//! it is applied ([`ChangeVector::project`]).
//!
//! # Alignment
//!
//! `current` is aligned to `baseline`'s tenors. A tenor missing from
//! `current` takes the nearest earlier available quote (forward fill), or
//! failing that the nearest later one (backward fill). A missing tenor is
//! therefore indistinguishable from an unchanged neighbour move; the number
//! of filled tenors is reported by [`ChangeVector::filled`].

use rates_core::market_data::{RateUnit, TermStructure};
use rates_core::types::Tenor;
use rates_core::RevalError;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Per-tenor quote change in decimal-rate units.
///
/// # Example
///
/// ```
/// use rates_core::market_data::{RateUnit, TermStructure};
/// use rates_risk::ChangeVector;
///
/// let base = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06)]).unwrap();
/// let cur = TermStructure::from_labels(&[("1Y", 0.051), ("2Y", 0.06)]).unwrap();
///
/// let change = ChangeVector::diff(&base, &cur);
/// assert_eq!(change.labels(), &["1Y".to_string(), "2Y".to_string()]);
///
/// let bps = change.project(&["2Y".to_string(), "1Y".to_string()], RateUnit::BasisPoints);
/// assert!((bps[1] - 10.0).abs() < 1e-9);
/// assert_eq!(bps[0], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ChangeVector {
    labels: Vec<String>,
    deltas: Vec<f64>,
    filled: usize,
}

impl ChangeVector {
    /// Builds a change vector from decimal deltas.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the lengths differ.
    pub fn new(labels: Vec<String>, deltas: Vec<f64>) -> Result<Self, RevalError> {
        if labels.len() != deltas.len() {
            return Err(RevalError::dimension(
                "change vector labels",
                deltas.len(),
                labels.len(),
            ));
        }
        Ok(Self {
            labels,
            deltas,
            filled: 0,
        })
    }

    /// Builds a change vector from `(label, decimal delta)` pairs.
    pub fn from_pairs<L: Into<String>>(pairs: impl IntoIterator<Item = (L, f64)>) -> Self {
        let (labels, deltas) = pairs.into_iter().map(|(l, d)| (l.into(), d)).unzip();
        Self {
            labels,
            deltas,
            filled: 0,
        }
    }

    /// All-zero change over `labels`.
    pub fn zeros(labels: Vec<String>) -> Self {
        let deltas = vec![0.0; labels.len()];
        Self {
            labels,
            deltas,
            filled: 0,
        }
    }

    /// `current − baseline` aligned to `baseline`'s tenors, in decimals.
    pub fn diff(baseline: &TermStructure, current: &TermStructure) -> Self {
        let base = baseline.to_unit(RateUnit::Decimal);
        let cur = current.to_unit(RateUnit::Decimal);

        let raw: Vec<Option<f64>> = base.iter().map(|p| cur.rate(&p.tenor)).collect();
        let filled = raw.iter().filter(|r| r.is_none()).count();
        let aligned = fill_gaps(&raw);

        let deltas = match aligned {
            Some(values) => values
                .iter()
                .zip(base.iter())
                .map(|(c, b)| c - b.rate)
                .collect(),
            // Nothing in common: treat as unchanged
            None => vec![0.0; base.len()],
        };

        if filled > 0 {
            debug!(
                filled,
                total = base.len(),
                "Filled missing tenors from neighbours"
            );
        }

        Self {
            labels: base.labels(),
            deltas,
            filled,
        }
    }

    /// Tenor labels, baseline order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Decimal deltas, aligned with [`ChangeVector::labels`].
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// Number of baseline tenors that were missing in `current`.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Number of tenors.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// `true` when there are no tenors.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `true` when every delta is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.deltas.iter().all(|d| *d == 0.0)
    }

    /// Decimal delta for a tenor label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.position(label).map(|i| self.deltas[i])
    }

    /// Multiplies every delta by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            labels: self.labels.clone(),
            deltas: self.deltas.iter().map(|d| d * factor).collect(),
            filled: self.filled,
        }
    }

    /// Element-wise sum of two change vectors over the same labels.
    pub fn combine(&self, other: &ChangeVector) -> Result<Self, RevalError> {
        if self.labels != other.labels {
            return Err(RevalError::dimension(
                "combined change vectors",
                self.len(),
                other.len(),
            ));
        }
        Ok(Self {
            labels: self.labels.clone(),
            deltas: self
                .deltas
                .iter()
                .zip(&other.deltas)
                .map(|(a, b)| a + b)
                .collect(),
            filled: self.filled.max(other.filled),
        })
    }

    /// Deltas reordered into `columns` and expressed in `unit`.
    ///
    /// A column with no delta contributes zero. Tenors outside `columns`
    /// are dropped.
    pub fn project(&self, columns: &[String], unit: RateUnit) -> Vec<f64> {
        let scale = unit.per_decimal();
        let mut used = 0usize;
        let out = columns
            .iter()
            .map(|column| match self.position(column) {
                Some(i) => {
                    used += 1;
                    self.deltas[i] * scale
                }
                None => {
                    let missing = RevalError::MissingSensitivity {
                        key: column.clone(),
                    };
                    warn!(error = %missing, "No market change for column, using zero");
                    0.0
                }
            })
            .collect();

        if used < self.len() {
            debug!(
                dropped = self.len() - used,
                "Dropped tenors outside the matrix columns"
            );
        }
        out
    }

    fn position(&self, label: &str) -> Option<usize> {
        if let Some(i) = self.labels.iter().position(|l| l == label) {
            return Some(i);
        }
        // Fall back to tenor equality ("12m" == "12M")
        let tenor: Tenor = label.parse().ok()?;
        self.labels
            .iter()
            .position(|l| l.parse::<Tenor>().map(|t| t == tenor).unwrap_or(false))
    }
}

/// Forward fill then backward fill; `None` when every entry is missing.
fn fill_gaps(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let first = values.iter().flatten().next().copied()?;
    let mut last = first;
    Some(
        values
            .iter()
            .map(|v| {
                if let Some(x) = v {
                    last = *x;
                }
                last
            })
            .collect(),
    )
}
