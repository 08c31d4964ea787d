//! Swap trade definitions as they appear on a blotter.

use serde::{Deserialize, Serialize};

use super::time::Date;

/// Static definition of a fixed-vs-floating swap.
///
/// The definition is what a caller selects; building the priceable
/// instrument (schedules, conventions) is the job of a
/// [`PricingBackend`](crate::traits::PricingBackend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwapDefinition {
    /// Trade identifier
    #[serde(rename = "ID")]
    pub id: String,
    /// Effective date
    pub start_date: Date,
    /// Final maturity
    pub termination_date: Date,
    /// Signed notional (positive pays fixed)
    pub notional: f64,
    /// Fixed rate in decimals
    pub fixed_rate: f64,
    /// Owning counterparty, if known
    #[serde(default, rename = "CounterpartyID")]
    pub counterparty_id: Option<String>,
}

impl SwapDefinition {
    /// Creates a definition without counterparty.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        termination_date: Date,
        notional: f64,
        fixed_rate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            start_date,
            termination_date,
            notional,
            fixed_rate,
            counterparty_id: None,
        }
    }

    /// Returns `true` when the swap has already started on `date`.
    pub fn is_seasoned(&self, date: Date) -> bool {
        self.start_date < date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_blotter_row() {
        let json = r#"{
            "ID": "SWP-001",
            "StartDate": "2024-01-15",
            "TerminationDate": "2029-01-15",
            "Notional": 1000000.0,
            "FixedRate": 0.0425
        }"#;
        let def: SwapDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.id, "SWP-001");
        assert_eq!(def.counterparty_id, None);
        assert!(def.is_seasoned(Date::from_ymd(2024, 6, 1).unwrap()));
        assert!(!def.is_seasoned(Date::from_ymd(2024, 1, 15).unwrap()));
    }
}
