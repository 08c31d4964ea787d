//! Stacking solver deltas into sensitivity matrices.
//!
//! The builder asks an external [`DeltaSolver`] for the sensitivity of each
//! requested output to every calibration instrument, and stacks the answers
//! in output order. Shapes are checked against the calibration set before a
//! matrix is returned, so a misaligned solver fails fast instead of silently
//! mixing tenors.

use std::time::Instant;

use rates_core::market_data::TermStructure;
use rates_core::traits::{DeltaSolver, DeltaTarget};
use rates_core::RevalError;
use tracing::debug;

use super::matrix::SensitivityMatrix;

/// Builds [`SensitivityMatrix`] values whose columns follow one calibration
/// set.
///
/// # Example
///
/// ```
/// use rates_core::market_data::TermStructure;
/// use rates_core::traits::{DeltaSolver, DeltaTarget};
/// use rates_core::RevalError;
/// use rates_risk::SensitivityMatrixBuilder;
///
/// struct Fixed;
/// impl DeltaSolver<()> for Fixed {
///     fn instrument_labels(&self) -> Vec<String> {
///         vec!["1Y".into(), "2Y".into()]
///     }
///     fn delta(&self, _: DeltaTarget<'_, ()>) -> Result<Vec<f64>, RevalError> {
///         Ok(vec![10.0, 20.0])
///     }
/// }
///
/// let quotes = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06)]).unwrap();
/// let builder = SensitivityMatrixBuilder::new(&quotes).unwrap();
/// let m = builder
///     .build(&Fixed, vec![("npv".to_string(), DeltaTarget::Npv(&()))])
///     .unwrap();
/// assert_eq!(m.row_by_key("npv").unwrap(), &[10.0, 20.0]);
/// ```
#[derive(Debug, Clone)]
pub struct SensitivityMatrixBuilder {
    columns: Vec<String>,
}

impl SensitivityMatrixBuilder {
    /// Fixes the expected columns to the calibration set's tenors.
    ///
    /// # Errors
    ///
    /// `EmptyCalibration` if `calibration` has no points.
    pub fn new(calibration: &TermStructure) -> Result<Self, RevalError> {
        if calibration.is_empty() {
            return Err(RevalError::EmptyCalibration);
        }
        Ok(Self {
            columns: calibration.labels(),
        })
    }

    /// Expected column labels.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Requests one delta row per output and stacks them.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` when the solver's instrument count or any delta
    ///   vector length differs from the calibration set
    /// - `Collaborator` when the solver's instrument labels are in a
    ///   different order than the calibration tenors
    pub fn build<'a, S, D>(
        &self,
        solver: &D,
        outputs: Vec<(String, DeltaTarget<'a, S>)>,
    ) -> Result<SensitivityMatrix, RevalError>
    where
        S: ?Sized,
        D: DeltaSolver<S>,
    {
        let start = Instant::now();
        self.check_instruments(&solver.instrument_labels())?;

        let mut keys = Vec::with_capacity(outputs.len());
        let mut rows = Vec::with_capacity(outputs.len());
        for (key, target) in outputs {
            let row = solver.delta(target)?;
            if row.len() != self.columns.len() {
                return Err(RevalError::dimension(
                    format!("delta row '{}'", key),
                    self.columns.len(),
                    row.len(),
                ));
            }
            keys.push(key);
            rows.push(row);
        }

        let matrix = SensitivityMatrix::new(keys, self.columns.clone(), solver.unit(), rows)?;
        debug!(
            rows = matrix.n_rows(),
            cols = matrix.n_cols(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Built sensitivity matrix"
        );
        Ok(matrix)
    }

    fn check_instruments(&self, labels: &[String]) -> Result<(), RevalError> {
        if labels.len() != self.columns.len() {
            return Err(RevalError::dimension(
                "solver instruments",
                self.columns.len(),
                labels.len(),
            ));
        }
        for (i, (got, want)) in labels.iter().zip(&self.columns).enumerate() {
            if !same_tenor(got, want) {
                return Err(RevalError::collaborator(format!(
                    "solver instrument {} is '{}' but calibration tenor is '{}'",
                    i, got, want
                )));
            }
        }
        Ok(())
    }
}

/// Label equality, tolerant of case and whitespace.
fn same_tenor(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_core::market_data::RateUnit;
    use rates_core::types::Date;

    struct Solver {
        labels: Vec<String>,
        width: usize,
    }

    impl DeltaSolver<()> for Solver {
        fn instrument_labels(&self) -> Vec<String> {
            self.labels.clone()
        }

        fn unit(&self) -> RateUnit {
            RateUnit::BasisPoints
        }

        fn delta(&self, target: DeltaTarget<'_, ()>) -> Result<Vec<f64>, RevalError> {
            let base = match target {
                DeltaTarget::DiscountFactor(_) => 1.0,
                _ => 2.0,
            };
            Ok((0..self.width).map(|i| base * (i + 1) as f64).collect())
        }
    }

    fn quotes() -> TermStructure {
        TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06), ("5Y", 0.07)]).unwrap()
    }

    fn labels() -> Vec<String> {
        vec!["1Y".into(), "2Y".into(), "5Y".into()]
    }

    #[test]
    fn test_rows_in_output_order() {
        let builder = SensitivityMatrixBuilder::new(&quotes()).unwrap();
        let solver = Solver {
            labels: labels(),
            width: 3,
        };
        let date = Date::from_ymd(2025, 1, 1).unwrap();
        let m = builder
            .build(
                &solver,
                vec![
                    ("npv".into(), DeltaTarget::Npv(&())),
                    ("df".into(), DeltaTarget::DiscountFactor(date)),
                ],
            )
            .unwrap();
        assert_eq!(m.row_keys(), &["npv".to_string(), "df".to_string()]);
        assert_eq!(m.row(0).unwrap(), &[2.0, 4.0, 6.0]);
        assert_eq!(m.row(1).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(m.unit(), RateUnit::BasisPoints);
    }

    #[test]
    fn test_short_delta_rejected() {
        let builder = SensitivityMatrixBuilder::new(&quotes()).unwrap();
        let solver = Solver {
            labels: labels(),
            width: 2,
        };
        let err = builder
            .build(&solver, vec![("npv".into(), DeltaTarget::Npv(&()))])
            .unwrap_err();
        assert_eq!(err, RevalError::dimension("delta row 'npv'", 3, 2));
    }

    #[test]
    fn test_instrument_mismatch_rejected() {
        let builder = SensitivityMatrixBuilder::new(&quotes()).unwrap();
        let short = Solver {
            labels: vec!["1Y".into(), "2Y".into()],
            width: 3,
        };
        assert!(matches!(
            builder.build::<(), _>(&short, vec![]),
            Err(RevalError::DimensionMismatch { .. })
        ));

        let swapped = Solver {
            labels: vec!["2Y".into(), "1Y".into(), "5Y".into()],
            width: 3,
        };
        assert!(matches!(
            builder.build::<(), _>(&swapped, vec![]),
            Err(RevalError::Collaborator(_))
        ));
    }

    #[test]
    fn test_empty_calibration() {
        let empty = TermStructure::new(vec![]).unwrap();
        assert!(matches!(
            SensitivityMatrixBuilder::new(&empty),
            Err(RevalError::EmptyCalibration)
        ));
    }
}
