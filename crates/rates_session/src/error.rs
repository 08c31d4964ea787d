//! Error types for swap sessions.

use std::fmt;

use rates_core::RevalError;
use serde::Serialize;
use thiserror::Error;

/// Lifecycle state of a [`SwapContext`](crate::SwapContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextState {
    /// No swap or market selected
    Uninitialized,
    /// Swap, curve and calibration set; solver and curve matrix built
    ContextSet,
    /// Fixings applied; instrument and baseline tables built
    Hydrated,
    /// At least one revaluation against the current baseline
    Revalued,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextState::Uninitialized => "UNINITIALIZED",
            ContextState::ContextSet => "CONTEXT_SET",
            ContextState::Hydrated => "HYDRATED",
            ContextState::Revalued => "REVALUED",
        };
        f.write_str(name)
    }
}

/// Session error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Operation called before the session reached the state it needs.
    #[error("{operation} requires {required} but session is {current}")]
    InvalidState {
        /// Operation name
        operation: &'static str,
        /// Minimum state
        required: ContextState,
        /// Current state
        current: ContextState,
    },

    /// Revaluation or collaborator failure.
    #[error(transparent)]
    Reval(#[from] RevalError),
}

impl SessionError {
    /// Returns `true` if the error comes from calling an operation too early.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, SessionError::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_order_follows_lifecycle() {
        assert!(ContextState::Uninitialized < ContextState::ContextSet);
        assert!(ContextState::ContextSet < ContextState::Hydrated);
        assert!(ContextState::Hydrated < ContextState::Revalued);
    }

    #[test]
    fn test_invalid_state_display() {
        let err = SessionError::InvalidState {
            operation: "revalue",
            required: ContextState::Hydrated,
            current: ContextState::ContextSet,
        };
        assert_eq!(
            err.to_string(),
            "revalue requires HYDRATED but session is CONTEXT_SET"
        );
        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_reval_error_is_transparent() {
        let err: SessionError = RevalError::EmptyCalibration.into();
        assert_eq!(err.to_string(), "Calibration set is empty");
        assert!(!err.is_invalid_state());
    }
}
