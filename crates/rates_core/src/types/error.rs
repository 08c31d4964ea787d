//! Error types for structured error handling.
//!
//! This module provides:
//! - `DateError`: Errors from date construction, parsing and tenor arithmetic
//! - `TenorError`: Errors from tenor label parsing
//! - `RevalError`: Errors from sensitivity-based revaluation
//!
//! Revaluation errors fall into two groups. Fatal kinds
//! (`DimensionMismatch`, `UnknownTenorUnit`, `Collaborator`) abort the call
//! and leave all baseline state untouched. Recoverable kinds
//! (`MissingSensitivity`, `EmptyRiskTable`, `EmptyCalibration`,
//! `DivisionGuard`) are resolved by policy inside the engine and only
//! surface through logging.

use thiserror::Error;

/// Date-related errors.
///
/// # Examples
/// ```
/// use rates_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component
        month: u32,
        /// Day component
        day: u32,
    },

    /// Failed to parse a date string.
    #[error("Failed to parse date: {0}")]
    ParseError(String),

    /// Date arithmetic left the representable range.
    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Tenor label errors.
///
/// # Examples
/// ```
/// use rates_core::types::TenorError;
///
/// let err = TenorError::UnknownUnit { label: "5Q".to_string() };
/// assert_eq!(format!("{}", err), "Unknown tenor unit in '5Q'");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenorError {
    /// The trailing unit letter is not one of D, W, M, Y.
    #[error("Unknown tenor unit in '{label}'")]
    UnknownUnit {
        /// The offending label
        label: String,
    },

    /// The numeric part of the label could not be parsed.
    #[error("Invalid tenor count in '{label}'")]
    InvalidCount {
        /// The offending label
        label: String,
    },

    /// The same tenor label appears more than once in a term structure.
    #[error("Duplicate tenor '{label}'")]
    Duplicate {
        /// The repeated label
        label: String,
    },

    /// The label is not part of the term structure.
    #[error("Tenor '{label}' not found")]
    NotFound {
        /// The missing label
        label: String,
    },
}

/// Errors raised by sensitivity-based revaluation.
///
/// # Examples
/// ```
/// use rates_core::RevalError;
///
/// let err = RevalError::DimensionMismatch {
///     context: "npv matrix".to_string(),
///     expected: 3,
///     actual: 2,
/// };
/// assert!(err.is_fatal());
/// assert_eq!(
///     format!("{}", err),
///     "Dimension mismatch in npv matrix: expected 3, got 2"
/// );
///
/// assert!(!RevalError::EmptyRiskTable.is_fatal());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevalError {
    /// Shape mismatch between a matrix and the data applied to it.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Where the mismatch was detected
        context: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A tenor or bucket has no row/column in a sensitivity matrix.
    #[error("Missing sensitivity for '{key}'")]
    MissingSensitivity {
        /// Tenor label or bucket key
        key: String,
    },

    /// No risk data is available yet.
    #[error("Risk table is empty")]
    EmptyRiskTable,

    /// No calibration instruments are available yet.
    #[error("Calibration set is empty")]
    EmptyCalibration,

    /// A near-zero denominator was replaced by an epsilon.
    #[error("Near-zero denominator {denominator} replaced by epsilon")]
    DivisionGuard {
        /// The original denominator
        denominator: f64,
    },

    /// A tenor label could not be parsed.
    #[error("Unknown tenor unit in '{label}'")]
    UnknownTenorUnit {
        /// The offending label
        label: String,
    },

    /// An external curve, solver or instrument reported a failure.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),
}

impl RevalError {
    /// Returns `true` if the error aborts the current operation.
    ///
    /// Non-fatal kinds describe conditions the engine resolves by policy
    /// (zero contribution, passthrough, epsilon substitution).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RevalError::DimensionMismatch { .. }
                | RevalError::UnknownTenorUnit { .. }
                | RevalError::Collaborator(_)
        )
    }

    /// Shorthand for a dimension mismatch.
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        RevalError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Shorthand for a collaborator failure.
    pub fn collaborator(msg: impl Into<String>) -> Self {
        RevalError::Collaborator(msg.into())
    }
}

impl From<TenorError> for RevalError {
    fn from(err: TenorError) -> Self {
        match err {
            TenorError::UnknownUnit { label } | TenorError::InvalidCount { label } => {
                RevalError::UnknownTenorUnit { label }
            }
            TenorError::NotFound { label } => RevalError::MissingSensitivity { key: label },
            other => RevalError::Collaborator(other.to_string()),
        }
    }
}

impl From<DateError> for RevalError {
    fn from(err: DateError) -> Self {
        RevalError::Collaborator(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RevalError::dimension("x", 1, 2).is_fatal());
        assert!(RevalError::UnknownTenorUnit {
            label: "3Q".to_string()
        }
        .is_fatal());
        assert!(RevalError::collaborator("solver").is_fatal());

        assert!(!RevalError::MissingSensitivity {
            key: "2Y".to_string()
        }
        .is_fatal());
        assert!(!RevalError::EmptyRiskTable.is_fatal());
        assert!(!RevalError::EmptyCalibration.is_fatal());
        assert!(!RevalError::DivisionGuard { denominator: 0.0 }.is_fatal());
    }

    #[test]
    fn test_tenor_error_conversion() {
        let err: RevalError = TenorError::UnknownUnit {
            label: "7X".to_string(),
        }
        .into();
        assert_eq!(
            err,
            RevalError::UnknownTenorUnit {
                label: "7X".to_string()
            }
        );

        let err: RevalError = TenorError::NotFound {
            label: "9Y".to_string(),
        }
        .into();
        assert!(matches!(err, RevalError::MissingSensitivity { .. }));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            format!("{}", RevalError::DivisionGuard { denominator: 0.0 }),
            "Near-zero denominator 0 replaced by epsilon"
        );
        assert_eq!(
            format!("{}", TenorError::Duplicate { label: "1Y".into() }),
            "Duplicate tenor '1Y'"
        );
    }
}
