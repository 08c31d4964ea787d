//! CLI error types.

use std::path::PathBuf;

use rates_core::market_data::MarketDataError;
use rates_core::types::{DateError, TenorError};
use rates_core::RevalError;
use rates_market::SimulatorError;
use rates_session::SessionError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `rates-desk` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is not valid JSON for its command.
    #[error("Invalid input in {path}: {message}")]
    Input {
        /// File the problem was found in
        path: String,
        /// What was wrong
        message: String,
    },

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Simulator failure.
    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    /// Revaluation failure.
    #[error(transparent)]
    Reval(#[from] RevalError),

    /// Session failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// JSON output failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Shorthand for an input error.
    pub fn input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<TenorError> for CliError {
    fn from(err: TenorError) -> Self {
        Self::Reval(err.into())
    }
}

impl From<DateError> for CliError {
    fn from(err: DateError) -> Self {
        Self::Reval(err.into())
    }
}

impl From<MarketDataError> for CliError {
    fn from(err: MarketDataError) -> Self {
        Self::Reval(err.into())
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
