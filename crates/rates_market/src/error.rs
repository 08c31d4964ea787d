//! Simulator error types.

use rates_core::RevalError;
use thiserror::Error;

/// Failures raised before a tick mutates any state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    /// Target tenor is not part of the simulated curve.
    #[error("Tenor '{label}' is not on the simulated curve")]
    UnknownTenor {
        /// Requested tenor label
        label: String,
    },

    /// The simulated curve has no points.
    #[error("Cannot tick an empty curve")]
    EmptyCurve,

    /// A parameter is outside its admissible range.
    #[error("Invalid simulator parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Admissible range
        reason: &'static str,
    },
}

impl From<SimulatorError> for RevalError {
    fn from(err: SimulatorError) -> Self {
        match err {
            SimulatorError::UnknownTenor { label } => RevalError::MissingSensitivity { key: label },
            SimulatorError::EmptyCurve => RevalError::EmptyCalibration,
            other => RevalError::Collaborator(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SimulatorError::InvalidParameter {
            name: "rho",
            value: 1.5,
            reason: "must lie in [0, 1]",
        };
        assert_eq!(
            err.to_string(),
            "Invalid simulator parameter rho = 1.5: must lie in [0, 1]"
        );
    }

    #[test]
    fn test_into_reval_error() {
        let err: RevalError = SimulatorError::EmptyCurve.into();
        assert_eq!(err, RevalError::EmptyCalibration);
        let err: RevalError = SimulatorError::UnknownTenor {
            label: "7Y".into(),
        }
        .into();
        assert!(!err.is_fatal());
    }
}
