//! Desk configuration.
//!
//! Loaded from a TOML file (`rates-desk.toml` by default) with
//! `RATES_DESK_*` environment variable overrides:
//!
//! ```toml
//! log_level = "info"
//! rng_seed = 42
//! ticks = 20
//!
//! [simulator]
//! rho = 0.9
//! sigma_bps = 5.0
//! mean_reversion = 0.02
//! margin_bps = 3.0
//!
//! [seed_curve]   # percent; the USD SOFR curve when absent
//! 1Y = 4.30
//! 5Y = 3.90
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rates_core::market_data::TermStructure;
use rates_market::{seed, usd_sofr_seed, SimulatorParams};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Upper bound on ticks per run.
pub const MAX_TICKS: usize = 1_000_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(String),
    /// Config file is not valid TOML for [`DeskConfig`].
    #[error("Parse error: {0}")]
    Parse(String),
    /// One or more values are out of range.
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// `rates-desk` configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    /// Default log directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Simulator RNG seed; entropy when absent
    pub rng_seed: Option<u64>,
    /// Ticks per simulation run
    pub ticks: usize,
    /// Simulator parameters
    pub simulator: SimulatorParams,
    /// Seed curve override, tenor label → rate in percent
    pub seed_curve: Option<BTreeMap<String, f64>>,
    /// Default blotter file for `approx`
    pub blotter: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rng_seed: None,
            ticks: 10,
            simulator: SimulatorParams::default(),
            seed_curve: None,
            blotter: None,
        }
    }
}

impl DeskConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `RATES_DESK_*` environment overrides.
    pub fn with_env_override(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (environment variable name → value).
    ///
    /// Unparsable numeric values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("RATES_DESK_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(seed) = lookup("RATES_DESK_RNG_SEED").and_then(|v| v.parse().ok()) {
            self.rng_seed = Some(seed);
        }
        if let Some(ticks) = lookup("RATES_DESK_TICKS").and_then(|v| v.parse().ok()) {
            self.ticks = ticks;
        }
        if let Some(rho) = lookup("RATES_DESK_RHO").and_then(|v| v.parse().ok()) {
            self.simulator.rho = rho;
        }
        if let Some(sigma) = lookup("RATES_DESK_SIGMA_BPS").and_then(|v| v.parse().ok()) {
            self.simulator.sigma_bps = sigma;
        }
        if let Some(path) = lookup("RATES_DESK_BLOTTER") {
            self.blotter = Some(PathBuf::from(path));
        }
        self
    }

    /// Checks every value and reports all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, LOG_LEVELS
            ));
        }

        if self.ticks == 0 {
            errors.push("ticks must be greater than 0".to_string());
        }
        if self.ticks > MAX_TICKS {
            errors.push(format!(
                "ticks {} exceeds maximum allowed ({})",
                self.ticks, MAX_TICKS
            ));
        }

        if let Err(e) = self.simulator.validate() {
            errors.push(format!("simulator: {}", e));
        }

        if let Some(curve) = &self.seed_curve {
            if curve.is_empty() {
                errors.push("seed_curve cannot be empty".to_string());
            } else if let Err(e) = self.seed_term_structure() {
                errors.push(format!("seed_curve: {}", e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Loads, applies environment overrides and validates.
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Seed curve: the configured override, or USD SOFR.
    pub fn seed_term_structure(&self) -> Result<TermStructure, ConfigError> {
        match &self.seed_curve {
            None => Ok(usd_sofr_seed()),
            Some(points) => {
                let points: Vec<(&str, f64)> =
                    points.iter().map(|(k, v)| (k.as_str(), *v)).collect();
                seed::seed_from_percent(&points).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = DeskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seed_term_structure().unwrap().len(), 31);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = DeskConfig::from_toml(
            r#"
            rng_seed = 7
            ticks = 3

            [simulator]
            sigma_bps = 1.5
            target = "5Y"

            [seed_curve]
            1Y = 4.3
            5Y = 3.9
            "#,
        )
        .unwrap();

        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.ticks, 3);
        assert_eq!(config.simulator.sigma_bps, 1.5);
        assert_eq!(config.simulator.rho, SimulatorParams::default().rho);
        assert_eq!(config.simulator.target, Some("5Y".parse().unwrap()));

        let seed = config.seed_term_structure().unwrap();
        assert_eq!(seed.labels(), vec!["1Y".to_string(), "5Y".to_string()]);
        assert!((seed.rates()[0] - 0.043).abs() < 1e-15);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = DeskConfig {
            log_level: "loud".into(),
            ticks: 0,
            simulator: SimulatorParams::default().with_rho(2.0),
            seed_curve: Some(BTreeMap::from([("5Q".to_string(), 4.0)])),
            ..DeskConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars = BTreeMap::from([
            ("RATES_DESK_TICKS", "250"),
            ("RATES_DESK_SIGMA_BPS", "0.5"),
            ("RATES_DESK_RNG_SEED", "not a number"),
            ("RATES_DESK_BLOTTER", "/tmp/blotter.json"),
        ]);
        let config = DeskConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.ticks, 250);
        assert_eq!(config.simulator.sigma_bps, 0.5);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.blotter, Some(PathBuf::from("/tmp/blotter.json")));
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\nticks = 5").unwrap();
        let config = DeskConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.ticks, 5);

        let missing = Path::new("/definitely/not/here/rates-desk.toml");
        assert!(matches!(DeskConfig::load(missing), Err(ConfigError::Io(_))));
        assert_eq!(DeskConfig::load_or_default(missing).unwrap(), DeskConfig::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DeskConfig::from_toml("ticks = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
