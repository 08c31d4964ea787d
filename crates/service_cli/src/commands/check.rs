//! Check command implementation
//!
//! Validates configuration and, when given, input files without running a
//! simulation.

use std::path::Path;

use tracing::info;

use crate::config::DeskConfig;
use crate::input::{BlotterFile, CashflowFile};
use crate::Result;

/// Run the check command
pub fn run(config: &DeskConfig, blotter: Option<&Path>, cashflows: Option<&Path>) -> Result<()> {
    config.validate()?;
    let seed = config.seed_term_structure()?;
    println!(
        "config ok: {} seed tenors, {} ticks, rho {}, sigma {} bps",
        seed.len(),
        config.ticks,
        config.simulator.rho,
        config.simulator.sigma_bps
    );

    if let Some(path) = blotter {
        let file = BlotterFile::load(path)?;
        let rows = file.risk_rows();
        info!(path = %path.display(), "Checked blotter");
        println!(
            "blotter ok: {} swaps, {} risk rows ({:?})",
            file.swaps.len(),
            rows.len(),
            file.risk_unit
        );
    }

    if let Some(path) = cashflows {
        let file = CashflowFile::load(path)?;
        let buckets = file.buckets()?;
        info!(path = %path.display(), "Checked cashflows");
        println!(
            "cashflows ok: {} rows in {} buckets from {}",
            file.cashflows.len(),
            buckets.len(),
            file.anchor()
        );
    }
    Ok(())
}
