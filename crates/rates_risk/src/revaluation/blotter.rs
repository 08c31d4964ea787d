//! Approximate revaluation of a whole swap blotter.
//!
//! Each swap carries a baseline NPV and fixed rate; a separate risk table
//! holds, per swap id, the fixed-rate risk `R` and the NPV sensitivity to
//! each benchmark tenor. After a market move:
//!
//! ```text
//! NPV'  = NPV + risk · Δ
//! Par'  = FixedRate + NPV' / R        (R = 0 replaced by 1e-9)
//! ```
//!
//! Swaps run in parallel with Rayon; the risk table and change vector are
//! shared read-only.

use std::collections::BTreeMap;

use rates_core::market_data::RateUnit;
use rates_core::types::tenor::compare_labels;
use rates_core::RevalError;
use rayon::prelude::*;
use tracing::debug;

use super::change::ChangeVector;
use super::engine::{par_rate, reprice, SwapValuation, Valuation};
use crate::risk_series::normalize_key;
use crate::sensitivity::SensitivityMatrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Baseline quote of one swap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct SwapQuote {
    /// Swap identifier
    #[cfg_attr(feature = "serde", serde(rename = "ID"))]
    pub id: String,
    /// Baseline NPV
    #[cfg_attr(feature = "serde", serde(rename = "NPV"))]
    pub npv: f64,
    /// Contractual fixed rate
    pub fixed_rate: f64,
}

/// Risk row of one swap: fixed-rate risk plus per-tenor NPV sensitivities.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRow {
    /// Swap identifier
    pub id: String,
    /// NPV gained per unit decrease of the fixed rate
    pub fixed_rate_risk: f64,
    /// Tenor label → NPV sensitivity
    pub exposures: BTreeMap<String, f64>,
}

impl RiskRow {
    /// Creates a row with no exposures.
    pub fn new(id: impl Into<String>, fixed_rate_risk: f64) -> Self {
        Self {
            id: id.into(),
            fixed_rate_risk,
            exposures: BTreeMap::new(),
        }
    }

    /// Adds an exposure; `c_`-prefixed column names are normalised.
    pub fn with_exposure(mut self, tenor: &str, value: f64) -> Self {
        self.exposures.insert(normalize_key(tenor).to_string(), value);
        self
    }
}

/// Risk table for a blotter: one [`SensitivityMatrix`] row per swap id.
#[derive(Debug, Clone, PartialEq)]
pub struct BlotterRisk {
    matrix: SensitivityMatrix,
    fixed_rate_risk: BTreeMap<String, f64>,
}

impl BlotterRisk {
    /// Stacks risk rows into a matrix over the union of their tenors.
    ///
    /// Columns are ordered by tenor; a tenor absent from a row has zero
    /// sensitivity in that row. `unit` is the quote unit the exposures are
    /// expressed per.
    pub fn from_rows(rows: &[RiskRow], unit: RateUnit) -> Result<Self, RevalError> {
        let mut columns: Vec<String> = rows
            .iter()
            .flat_map(|r| r.exposures.keys().cloned())
            .collect();
        columns.sort_by(|a, b| compare_labels(a, b));
        columns.dedup();

        let keys: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let data: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| r.exposures.get(c).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        let fixed_rate_risk = rows
            .iter()
            .map(|r| (r.id.clone(), r.fixed_rate_risk))
            .collect();

        Ok(Self {
            matrix: SensitivityMatrix::new(keys, columns, unit, data)?,
            fixed_rate_risk,
        })
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &SensitivityMatrix {
        &self.matrix
    }

    /// Fixed-rate risk of a swap, if it has a risk row.
    pub fn fixed_rate_risk(&self, id: &str) -> Option<f64> {
        self.fixed_rate_risk.get(id).copied()
    }

    /// `true` when there are no risk rows.
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

/// Repriced blotter row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BlotterValuation {
    /// Swap identifier
    pub id: String,
    /// Contractual fixed rate
    pub fixed_rate: f64,
    /// Approximate NPV and par rate
    pub valuation: SwapValuation,
    /// `false` when the swap had no risk row and passed through unchanged
    pub approximated: bool,
}

/// Reprices every swap of a blotter under `change`.
///
/// Swaps without a risk row keep their NPV; their par rate equals the
/// fixed rate. An empty risk table passes the whole blotter through.
///
/// # Example
///
/// ```
/// use rates_core::market_data::RateUnit;
/// use rates_risk::{reprice_blotter, BlotterRisk, ChangeVector, RiskRow, SwapQuote};
///
/// let swaps = vec![SwapQuote { id: "S1".into(), npv: 1000.0, fixed_rate: 0.04 }];
/// let risk = BlotterRisk::from_rows(
///     &[RiskRow::new("S1", 50_000.0).with_exposure("1Y", 100.0)],
///     RateUnit::Decimal,
/// )
/// .unwrap();
/// let change = ChangeVector::from_pairs([("1Y", 0.001)]);
///
/// let out = reprice_blotter(&swaps, &risk, &change).unwrap();
/// assert!((out[0].valuation.npv - 1000.1).abs() < 1e-9);
/// ```
pub fn reprice_blotter(
    swaps: &[SwapQuote],
    risk: &BlotterRisk,
    change: &ChangeVector,
) -> Result<Vec<BlotterValuation>, RevalError> {
    let matrix = risk.matrix();
    let delta = change.project(matrix.columns(), matrix.unit());
    // One product for the whole blotter; rows are looked up per swap
    let moves = matrix.apply(&delta)?;

    let out: Vec<BlotterValuation> = swaps
        .par_iter()
        .map(|swap| match matrix.row_index(&swap.id) {
            Some(i) => {
                let npv = swap.npv + moves[i];
                let r = risk.fixed_rate_risk(&swap.id).unwrap_or(0.0);
                BlotterValuation {
                    id: swap.id.clone(),
                    fixed_rate: swap.fixed_rate,
                    valuation: SwapValuation {
                        npv,
                        par_rate: par_rate(swap.fixed_rate, npv, r),
                    },
                    approximated: true,
                }
            }
            None => BlotterValuation {
                id: swap.id.clone(),
                fixed_rate: swap.fixed_rate,
                valuation: SwapValuation {
                    npv: swap.npv,
                    par_rate: swap.fixed_rate,
                },
                approximated: false,
            },
        })
        .collect();

    let passed = out.iter().filter(|v| !v.approximated).count();
    debug!(
        swaps = out.len(),
        passed_through = passed,
        "Repriced blotter"
    );
    Ok(out)
}

/// Sequential variant of [`reprice_blotter`] built on [`reprice`]; used to
/// cross-check the parallel path.
pub fn reprice_blotter_sequential(
    swaps: &[SwapQuote],
    risk: &BlotterRisk,
    change: &ChangeVector,
) -> Result<Vec<BlotterValuation>, RevalError> {
    let table = Valuation::Table(swaps.iter().map(|s| (s.id.clone(), s.npv)).collect());
    let repriced = match reprice(&table, Some(risk.matrix()), change)? {
        Valuation::Table(rows) => rows,
        other => return Err(RevalError::dimension("blotter table", swaps.len(), other.len())),
    };

    Ok(swaps
        .iter()
        .zip(repriced)
        .map(|(swap, (_, npv))| match risk.fixed_rate_risk(&swap.id) {
            Some(r) => BlotterValuation {
                id: swap.id.clone(),
                fixed_rate: swap.fixed_rate,
                valuation: SwapValuation {
                    npv,
                    par_rate: par_rate(swap.fixed_rate, npv, r),
                },
                approximated: true,
            },
            None => BlotterValuation {
                id: swap.id.clone(),
                fixed_rate: swap.fixed_rate,
                valuation: SwapValuation {
                    npv: swap.npv,
                    par_rate: swap.fixed_rate,
                },
                approximated: false,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn swaps() -> Vec<SwapQuote> {
        vec![
            SwapQuote {
                id: "A".into(),
                npv: 1000.0,
                fixed_rate: 4.0,
            },
            SwapQuote {
                id: "B".into(),
                npv: -250.0,
                fixed_rate: 3.5,
            },
            SwapQuote {
                id: "C".into(),
                npv: 10.0,
                fixed_rate: 5.0,
            },
        ]
    }

    fn risk() -> BlotterRisk {
        BlotterRisk::from_rows(
            &[
                RiskRow::new("A", 400.0)
                    .with_exposure("c_1Y", 1.0)
                    .with_exposure("c_5Y", 2.0),
                RiskRow::new("B", 0.0).with_exposure("2Y", -3.0),
            ],
            RateUnit::Percent,
        )
        .unwrap()
    }

    #[test]
    fn test_columns_union_sorted() {
        assert_eq!(
            risk().matrix().columns(),
            &["1Y".to_string(), "2Y".to_string(), "5Y".to_string()]
        );
    }

    #[test]
    fn test_blotter_reprice_percent_units() {
        // +10bp on 2Y, +1bp on 5Y, expressed per percent
        let change = ChangeVector::from_pairs([("1Y", 0.0), ("2Y", 0.001), ("5Y", 0.0001)]);
        let out = reprice_blotter(&swaps(), &risk(), &change).unwrap();

        assert_relative_eq!(out[0].valuation.npv, 1000.0 + 2.0 * 0.01, epsilon = 1e-9);
        assert_relative_eq!(
            out[0].valuation.par_rate,
            4.0 + out[0].valuation.npv / 400.0,
            epsilon = 1e-12
        );

        assert_relative_eq!(out[1].valuation.npv, -250.0 - 3.0 * 0.1, epsilon = 1e-9);
        assert!(out[1].valuation.par_rate.is_finite());

        assert!(!out[2].approximated);
        assert_eq!(out[2].valuation.npv, 10.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let change = ChangeVector::from_pairs([("1Y", 0.0003), ("2Y", -0.0002), ("5Y", 0.0001)]);
        let par = reprice_blotter(&swaps(), &risk(), &change).unwrap();
        let seq = reprice_blotter_sequential(&swaps(), &risk(), &change).unwrap();
        for (a, b) in par.iter().zip(&seq) {
            assert_eq!(a.id, b.id);
            assert_relative_eq!(a.valuation.npv, b.valuation.npv, epsilon = 1e-12);
            assert_eq!(a.approximated, b.approximated);
        }
    }

    #[test]
    fn test_empty_risk_passes_through() {
        let empty = BlotterRisk::from_rows(&[], RateUnit::Percent).unwrap();
        assert!(empty.is_empty());
        let change = ChangeVector::from_pairs([("1Y", 0.01)]);
        let out = reprice_blotter(&swaps(), &empty, &change).unwrap();
        assert!(out.iter().all(|v| !v.approximated));
        assert_eq!(out[1].valuation.npv, -250.0);
    }
}
