//! Market data error types.
//!
//! Structured errors for curve construction, lookup and blob
//! (de)serialisation.

use thiserror::Error;

use crate::types::error::{DateError, RevalError};
use crate::types::time::Date;

/// Market data operation errors.
///
/// # Examples
///
/// ```
/// use rates_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InsufficientData { got: 0, need: 1 };
/// assert_eq!(format!("{}", err), "Insufficient data: got 0, need 1");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Query date precedes the curve's valuation date.
    #[error("Invalid maturity: {date} is before valuation date {valuation_date}")]
    InvalidMaturity {
        /// The requested date
        date: Date,
        /// The curve's valuation date
        valuation_date: Date,
    },

    /// Curve nodes are not strictly increasing after the valuation date.
    #[error("Unordered curve node at {date}")]
    UnorderedNodes {
        /// First offending node date
        date: Date,
    },

    /// Discount factor is non-positive or not finite.
    #[error("Invalid discount factor {value} at {date}")]
    InvalidDiscountFactor {
        /// Node date
        date: Date,
        /// Offending value
        value: f64,
    },

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Number of points required
        need: usize,
    },

    /// Date arithmetic failed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Curve blob could not be encoded or decoded.
    #[error("Curve blob error: {0}")]
    Blob(String),
}

impl From<MarketDataError> for RevalError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::InsufficientData { got, need } => {
                RevalError::dimension("curve nodes", need, got)
            }
            other => RevalError::Collaborator(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_maturity_display() {
        let err = MarketDataError::InvalidMaturity {
            date: Date::from_ymd(2024, 1, 1).unwrap(),
            valuation_date: Date::from_ymd(2024, 6, 1).unwrap(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid maturity: 2024-01-01 is before valuation date 2024-06-01"
        );
    }

    #[test]
    fn test_into_reval_error() {
        let err: RevalError = MarketDataError::InsufficientData { got: 2, need: 3 }.into();
        assert!(matches!(
            err,
            RevalError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));

        let err: RevalError = MarketDataError::Blob("eof".into()).into();
        assert!(err.is_fatal());
    }
}
