//! Approx command implementation
//!
//! Reprices a swap blotter after a simulated market move using
//! `NPV' = NPV + risk · Δ` and `Par' = FixedRate + NPV' / R`.

use std::path::Path;

use rates_risk::{reprice_blotter, BlotterRisk, BlotterValuation, ChangeVector};
use serde::Serialize;
use tracing::info;

use super::{print_json, simulate_move, OutputFormat};
use crate::config::DeskConfig;
use crate::input::BlotterFile;
use crate::Result;

#[derive(Serialize)]
struct ApproxOutput<'a> {
    change: &'a ChangeVector,
    swaps: &'a [BlotterValuation],
}

/// Run the approx command
pub fn run(config: &DeskConfig, blotter: &Path, ticks: usize, format: OutputFormat) -> Result<()> {
    let file = BlotterFile::load(blotter)?;
    let rows = file.risk_rows();
    let risk = BlotterRisk::from_rows(&rows, file.risk_unit)?;
    info!(
        swaps = file.swaps.len(),
        risk_rows = rows.len(),
        tenors = risk.matrix().n_cols(),
        "Loaded blotter"
    );

    let market = simulate_move(config, ticks)?;
    let change = ChangeVector::diff(&market.seed, &market.current);
    let out = reprice_blotter(&file.swaps, &risk, &change)?;

    match format {
        OutputFormat::Json => print_json(&ApproxOutput {
            change: &change,
            swaps: &out,
        })?,
        OutputFormat::Table => {
            println!(
                "{:<14}  {:>16}  {:>16}  {:>10}  {:>10}",
                "ID", "NPV", "NPV'", "fixed", "par'"
            );
            for (quote, v) in file.swaps.iter().zip(&out) {
                let marker = if v.approximated { "" } else { "  (no risk)" };
                println!(
                    "{:<14}  {:>16.2}  {:>16.2}  {:>10.6}  {:>10.6}{}",
                    v.id, quote.npv, v.valuation.npv, v.fixed_rate, v.valuation.par_rate, marker
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_approx_runs_on_blotter_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "swaps": [{{ "ID": "S1", "NPV": 100.0, "FixedRate": 0.04 }}],
                "risk": [{{ "ID": "S1", "R": 45000.0, "c_5Y": 4500.0 }}]
            }}"#
        )
        .unwrap();
        let config = DeskConfig {
            rng_seed: Some(5),
            ..DeskConfig::default()
        };
        run(&config, file.path(), 3, OutputFormat::Json).unwrap();
    }

    #[test]
    fn test_missing_blotter() {
        let err = run(
            &DeskConfig::default(),
            Path::new("/no/such/blotter.json"),
            1,
            OutputFormat::Table,
        )
        .unwrap_err();
        assert!(matches!(err, crate::CliError::FileNotFound(_)));
    }
}
