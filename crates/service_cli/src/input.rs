//! JSON input files: swap blotters and counterparty cashflows.
//!
//! Risk and cashflow-risk rows are free-form objects: apart from the
//! identifying columns, every numeric field is read as a tenor exposure.
//! Bookkeeping columns (`R`, `PricingTime`, `RowType`, ...) are skipped.

use std::path::Path;

use rates_core::market_data::RateUnit;
use rates_core::types::Date;
use rates_risk::buckets::{BucketAggregator, CashflowBucket};
use rates_risk::risk_series::is_excluded_key;
use rates_risk::{RiskRow, SwapQuote};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// Blotter file.
///
/// ```json
/// {
///   "risk_unit": "decimal",
///   "swaps": [{ "ID": "SWP-1", "NPV": 1250.0, "FixedRate": 0.041 }],
///   "risk":  [{ "ID": "SWP-1", "R": 4.2e7, "c_1Y": 120.0, "c_5Y": -80.0 }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BlotterFile {
    /// Unit of quote move the exposures refer to
    #[serde(default)]
    pub risk_unit: RateUnit,
    /// Swap quotes
    pub swaps: Vec<SwapQuote>,
    /// Raw risk rows
    #[serde(default)]
    pub risk: Vec<Map<String, Value>>,
}

impl BlotterFile {
    /// Reads and parses a blotter file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read(path)?;
        serde_json::from_str(&text).map_err(|e| CliError::input(path.display().to_string(), e.to_string()))
    }

    /// Risk rows with their exposures.
    ///
    /// Rows without a string `ID` are skipped; a missing `R` is read as
    /// zero.
    pub fn risk_rows(&self) -> Vec<RiskRow> {
        let rows: Vec<RiskRow> = self.risk.iter().filter_map(parse_risk_row).collect();
        if rows.len() < self.risk.len() {
            warn!(
                skipped = self.risk.len() - rows.len(),
                "Risk rows without an ID were skipped"
            );
        }
        rows
    }
}

fn parse_risk_row(raw: &Map<String, Value>) -> Option<RiskRow> {
    let id = raw.get("ID")?.as_str()?;
    let r = raw.get("R").and_then(Value::as_f64).unwrap_or(0.0);
    let row = exposures(raw)
        .into_iter()
        .fold(RiskRow::new(id, r), |row, (key, value)| row.with_exposure(key, value));
    Some(row)
}

fn exposures(raw: &Map<String, Value>) -> Vec<(&str, f64)> {
    raw.iter()
        .filter(|(key, _)| !is_excluded_key(key) && key.as_str() != "PaymentDate")
        .filter_map(|(key, value)| value.as_f64().map(|v| (key.as_str(), v)))
        .collect()
}

/// Counterparty cashflow file.
///
/// ```json
/// {
///   "today": "2025-01-02",
///   "risk_unit": "decimal",
///   "cashflows": [{ "PaymentDate": "2025-01-03", "TotalCashflow": 1000.0, "TotalWeight": 1.0 }],
///   "risk": [{ "PaymentDate": "2025-01-03", "c_1Y": 12.5 }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CashflowFile {
    /// Bucketing anchor; the current date when absent
    pub today: Option<Date>,
    /// Unit of quote move the risk columns refer to
    #[serde(default)]
    pub risk_unit: RateUnit,
    /// Cashflow rows
    pub cashflows: Vec<CashflowEntry>,
    /// Raw cashflow-risk rows
    #[serde(default)]
    pub risk: Vec<Map<String, Value>>,
}

/// One cashflow row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CashflowEntry {
    /// Payment date
    pub payment_date: Date,
    /// Cashflow amount
    #[serde(default)]
    pub total_cashflow: f64,
    /// Weight
    #[serde(default)]
    pub total_weight: f64,
}

impl CashflowFile {
    /// Reads and parses a cashflow file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read(path)?;
        serde_json::from_str(&text).map_err(|e| CliError::input(path.display().to_string(), e.to_string()))
    }

    /// Bucketing anchor.
    pub fn anchor(&self) -> Date {
        self.today.unwrap_or_else(Date::today)
    }

    /// Aggregates cashflows and risk into buckets.
    pub fn buckets(&self) -> Result<Vec<CashflowBucket>> {
        let mut agg = BucketAggregator::new(self.anchor());
        let mut dropped = 0usize;

        for cf in &self.cashflows {
            if !agg.add_cashflow(cf.payment_date, cf.total_cashflow, cf.total_weight)? {
                dropped += 1;
            }
        }

        for raw in &self.risk {
            let date = match raw.get("PaymentDate").and_then(Value::as_str) {
                Some(s) => s.parse::<Date>()?,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            if !agg.add_risk(date, exposures(raw))? {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!(dropped, "Rows outside the bucket horizon were dropped");
        }
        Ok(agg.finish())
    }
}

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOTTER: &str = r#"{
        "risk_unit": "percent",
        "swaps": [
            { "ID": "A", "NPV": 1000.0, "FixedRate": 4.0 },
            { "ID": "B", "NPV": -50.0, "FixedRate": 3.5 }
        ],
        "risk": [
            { "ID": "A", "R": 400.0, "c_1Y": 1.0, "c_5Y": 2.0, "PricingTime": 0.3, "RowType": "risk" },
            { "R": 1.0, "c_1Y": 5.0 }
        ]
    }"#;

    #[test]
    fn test_blotter_parses_risk_rows() {
        let blotter: BlotterFile = serde_json::from_str(BLOTTER).unwrap();
        assert_eq!(blotter.risk_unit, RateUnit::Percent);
        assert_eq!(blotter.swaps[1].id, "B");

        let rows = blotter.risk_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fixed_rate_risk, 400.0);
        assert_eq!(rows[0].exposures.len(), 2);
        assert_eq!(rows[0].exposures["5Y"], 2.0);
    }

    #[test]
    fn test_cashflow_buckets() {
        let file: CashflowFile = serde_json::from_str(
            r#"{
                "today": "2025-01-01",
                "cashflows": [
                    { "PaymentDate": "2025-01-02", "TotalCashflow": 100.0, "TotalWeight": 1.0 },
                    { "PaymentDate": "2025-01-02", "TotalCashflow": 50.0 },
                    { "PaymentDate": "2024-12-01", "TotalCashflow": 999.0 },
                    { "PaymentDate": "2027-05-01", "TotalCashflow": 10.0 }
                ],
                "risk": [
                    { "PaymentDate": "2025-01-02", "c_1Y": 3.0 },
                    { "c_1Y": 3.0 }
                ]
            }"#,
        )
        .unwrap();

        let buckets = file.buckets().unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket.key, "day:2025-01-02");
        assert_eq!(buckets[0].cashflow, 150.0);
        assert_eq!(buckets[0].risk["1Y"], 3.0);
        assert_eq!(buckets[1].bucket.key, "year:2027");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BlotterFile::load(Path::new("/no/such/blotter.json")),
            Err(CliError::FileNotFound(_))
        ));
    }
}
