//! Simulate command implementation
//!
//! Runs simulator ticks from the seed curve and prints each move.

use rates_core::types::Tenor;
use tracing::info;

use super::{print_json, simulator, OutputFormat, TickRow};
use crate::config::DeskConfig;
use crate::Result;

/// Run the simulate command
pub fn run(
    config: &DeskConfig,
    ticks: usize,
    target: Option<Tenor>,
    format: OutputFormat,
) -> Result<()> {
    let mut sim = simulator(config)?;
    let basis_point = sim.curve().unit().basis_point();
    info!(ticks, target = ?target, "Starting simulation");

    let mut rows = Vec::with_capacity(ticks);
    for step in 1..=ticks {
        let moved = match target {
            Some(tenor) => sim.tick_tenor(tenor)?,
            None => sim.tick()?,
        };
        rows.push(TickRow::new(step, &moved, basis_point));
    }

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!(
                "{:>5}  {:>5}  {:>10}  {:>10}  {:>8}  {:>21}",
                "step", "tenor", "previous", "rate", "Δ bps", "band"
            );
            for row in &rows {
                println!(
                    "{:>5}  {:>5}  {:>10.6}  {:>10.6}  {:>8.3}  [{:.6}, {:.6}]",
                    row.step, row.tenor, row.previous, row.rate, row.change_bps, row.lower, row.upper
                );
            }
            println!(
                "global factor after {} ticks: {:.4}",
                ticks,
                sim.state().global_factor()
            );
        }
    }
    Ok(())
}
