//! First-order revaluation: `new = baseline + M · Δ`.
//!
//! One [`reprice`] covers every output kind: a single number (swap NPV),
//! a vector aligned with the matrix rows (node discount factors, leg
//! rates), or a keyed table (counterparty buckets, blotter rows) where only
//! rows with a matching matrix key move.
//!
//! Results are pure functions of their inputs. The baseline is never
//! modified, so repeated calls against the same baseline are safe.

use rates_core::RevalError;
use tracing::{debug, warn};

use super::change::ChangeVector;
use crate::sensitivity::SensitivityMatrix;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Substitute for a near-zero fixed-rate risk.
pub const RISK_EPSILON: f64 = 1e-9;

/// Baseline or repriced output values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Valuation {
    /// One output (matrix with a single row)
    Scalar(f64),
    /// One value per matrix row, in row order
    Vector(Vec<f64>),
    /// Keyed values; keys are matched against matrix row keys
    Table(Vec<(String, f64)>),
}

impl Valuation {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Valuation::Scalar(_) => 1,
            Valuation::Vector(v) => v.len(),
            Valuation::Table(t) => t.len(),
        }
    }

    /// `true` when there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in order, keys dropped.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Valuation::Scalar(x) => vec![*x],
            Valuation::Vector(v) => v.clone(),
            Valuation::Table(t) => t.iter().map(|(_, x)| *x).collect(),
        }
    }

    /// The scalar value, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Valuation::Scalar(x) => Some(*x),
            _ => None,
        }
    }
}

/// Applies `change` through `matrix` to `baseline`.
///
/// - `matrix` absent or empty: `baseline` is returned unchanged
/// - `Scalar`: the matrix must have exactly one row
/// - `Vector`: the matrix must have one row per value
/// - `Table`: rows move by the matrix row with the same key; unmatched rows
///   contribute zero
///
/// # Errors
///
/// `DimensionMismatch` on a shape mismatch. Nothing is modified in that
/// case.
///
/// # Example
///
/// ```
/// use rates_core::market_data::RateUnit;
/// use rates_risk::{reprice, ChangeVector, SensitivityMatrix, Valuation};
///
/// let m = SensitivityMatrix::new(
///     vec!["npv".into()],
///     vec!["1Y".into(), "2Y".into(), "5Y".into()],
///     RateUnit::Decimal,
///     vec![vec![100.0, 200.0, 50.0]],
/// )
/// .unwrap();
/// let change = ChangeVector::from_pairs([("1Y", 0.001), ("2Y", 0.0), ("5Y", -0.0005)]);
///
/// let npv = reprice(&Valuation::Scalar(1000.0), Some(&m), &change).unwrap();
/// assert!((npv.as_scalar().unwrap() - 1000.075).abs() < 1e-9);
/// ```
pub fn reprice(
    baseline: &Valuation,
    matrix: Option<&SensitivityMatrix>,
    change: &ChangeVector,
) -> Result<Valuation, RevalError> {
    let matrix = match matrix {
        Some(m) if !m.is_empty() => m,
        _ => {
            debug!(error = %RevalError::EmptyRiskTable, "Passing baseline through");
            return Ok(baseline.clone());
        }
    };

    let delta = change.project(matrix.columns(), matrix.unit());
    let moves = matrix.apply(&delta)?;

    match baseline {
        Valuation::Scalar(x) => {
            if moves.len() != 1 {
                return Err(RevalError::dimension("scalar valuation", 1, moves.len()));
            }
            Ok(Valuation::Scalar(x + moves[0]))
        }
        Valuation::Vector(values) => {
            if values.len() != moves.len() {
                return Err(RevalError::dimension(
                    "vector valuation",
                    moves.len(),
                    values.len(),
                ));
            }
            Ok(Valuation::Vector(
                values.iter().zip(&moves).map(|(v, m)| v + m).collect(),
            ))
        }
        Valuation::Table(rows) => {
            let mut unmapped = 0usize;
            let out = rows
                .iter()
                .map(|(key, value)| match matrix.row_index(key) {
                    Some(i) => (key.clone(), value + moves[i]),
                    None => {
                        unmapped += 1;
                        (key.clone(), *value)
                    }
                })
                .collect();
            if unmapped > 0 {
                debug!(unmapped, "Table rows without sensitivities left unchanged");
            }
            Ok(Valuation::Table(out))
        }
    }
}

/// Denominator with near-zero or non-finite values replaced by
/// [`RISK_EPSILON`].
pub fn guard_denominator(denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator.abs() < RISK_EPSILON {
        let guard = RevalError::DivisionGuard { denominator };
        warn!(error = %guard, "Using epsilon denominator");
        return RISK_EPSILON;
    }
    denominator
}

/// Approximate par rate `fixed_rate + npv / fixed_rate_risk`.
///
/// `fixed_rate_risk` is the NPV gained per unit decrease of the fixed
/// rate. A zero risk is replaced by [`RISK_EPSILON`], so the result is
/// finite whenever `npv` and `fixed_rate` are.
///
/// ```
/// use rates_risk::par_rate;
///
/// assert!((par_rate(0.04, 500.0, 50_000.0) - 0.05).abs() < 1e-12);
/// assert!(par_rate(0.04, 500.0, 0.0).is_finite());
/// ```
pub fn par_rate(fixed_rate: f64, npv: f64, fixed_rate_risk: f64) -> f64 {
    fixed_rate + npv / guard_denominator(fixed_rate_risk)
}

/// NPV and par rate of one swap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SwapValuation {
    /// Net present value
    pub npv: f64,
    /// Par rate in the fixed rate's unit
    pub par_rate: f64,
}

/// Reprices a swap's NPV through its one-row matrix and derives the par
/// rate from the new NPV.
pub fn reprice_swap(
    npv: f64,
    fixed_rate: f64,
    fixed_rate_risk: f64,
    matrix: Option<&SensitivityMatrix>,
    change: &ChangeVector,
) -> Result<SwapValuation, RevalError> {
    let new_npv = match reprice(&Valuation::Scalar(npv), matrix, change)? {
        Valuation::Scalar(x) => x,
        other => {
            return Err(RevalError::dimension("swap npv", 1, other.len()));
        }
    };
    Ok(SwapValuation {
        npv: new_npv,
        par_rate: par_rate(fixed_rate, new_npv, fixed_rate_risk),
    })
}
