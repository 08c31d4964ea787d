//! Dense sensitivity (Jacobian) matrix.

use rates_core::market_data::RateUnit;
use rates_core::RevalError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major matrix of ∂output/∂quote.
///
/// Rows are output quantities identified by a key (discount-factor node,
/// cashflow row, swap id, bucket key). Columns are benchmark tenor labels in
/// term-structure order. `unit` is the unit of the quote move each column
/// refers to.
///
/// # Example
///
/// ```
/// use rates_core::market_data::RateUnit;
/// use rates_risk::SensitivityMatrix;
///
/// let m = SensitivityMatrix::new(
///     vec!["npv".to_string()],
///     vec!["1Y".to_string(), "2Y".to_string(), "5Y".to_string()],
///     RateUnit::Decimal,
///     vec![vec![100.0, 200.0, 50.0]],
/// )
/// .unwrap();
///
/// let moves = m.apply(&[0.001, 0.0, -0.0005]).unwrap();
/// assert!((moves[0] - 0.075).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensitivityMatrix {
    row_keys: Vec<String>,
    columns: Vec<String>,
    unit: RateUnit,
    data: Vec<f64>,
}

impl SensitivityMatrix {
    /// Builds a matrix from rows.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the number of keys differs from the number of
    /// rows, or any row length differs from the number of columns.
    pub fn new(
        row_keys: Vec<String>,
        columns: Vec<String>,
        unit: RateUnit,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, RevalError> {
        if row_keys.len() != rows.len() {
            return Err(RevalError::dimension(
                "sensitivity row keys",
                rows.len(),
                row_keys.len(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * columns.len());
        for (key, row) in row_keys.iter().zip(&rows) {
            if row.len() != columns.len() {
                return Err(RevalError::dimension(
                    format!("sensitivity row '{}'", key),
                    columns.len(),
                    row.len(),
                ));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            row_keys,
            columns,
            unit,
            data,
        })
    }

    /// Matrix with no rows over `columns`.
    pub fn empty(columns: Vec<String>, unit: RateUnit) -> Self {
        Self {
            row_keys: Vec::new(),
            columns,
            unit,
            data: Vec::new(),
        }
    }

    /// Number of output rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_keys.len()
    }

    /// Number of tenor columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `true` when there is nothing to apply.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty() || self.columns.is_empty()
    }

    /// Output keys in row order.
    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    /// Tenor labels in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Unit of the quote moves the columns refer to.
    pub fn unit(&self) -> RateUnit {
        self.unit
    }

    /// Row by position.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.n_rows() {
            return None;
        }
        let n = self.n_cols();
        Some(&self.data[index * n..(index + 1) * n])
    }

    /// Position of the row with `key`.
    pub fn row_index(&self, key: &str) -> Option<usize> {
        self.row_keys.iter().position(|k| k == key)
    }

    /// Row by key.
    pub fn row_by_key(&self, key: &str) -> Option<&[f64]> {
        self.row_index(key).and_then(|i| self.row(i))
    }

    /// Matrix-vector product `M · change`.
    ///
    /// `change` must be expressed in [`SensitivityMatrix::unit`] and ordered
    /// like [`SensitivityMatrix::columns`].
    pub fn apply(&self, change: &[f64]) -> Result<Vec<f64>, RevalError> {
        if change.len() != self.n_cols() {
            return Err(RevalError::dimension(
                "change vector",
                self.n_cols(),
                change.len(),
            ));
        }
        let n = self.n_cols();
        if n == 0 {
            return Ok(vec![0.0; self.n_rows()]);
        }
        Ok(self
            .data
            .chunks_exact(n)
            .map(|row| row.iter().zip(change).map(|(m, d)| m * d).sum())
            .collect())
    }

    /// Sum of every row, i.e. the sensitivity of the total.
    pub fn column_totals(&self) -> Vec<f64> {
        let n = self.n_cols();
        let mut totals = vec![0.0; n];
        if n == 0 {
            return totals;
        }
        for row in self.data.chunks_exact(n) {
            for (t, v) in totals.iter_mut().zip(row) {
                *t += v;
            }
        }
        totals
    }
}
