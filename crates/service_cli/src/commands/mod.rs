//! CLI command implementations
//!
//! Each submodule implements one `rates-desk` subcommand. The helpers here
//! build the simulator shared by every command that needs a market move.

pub mod approx;
pub mod buckets;
pub mod check;
pub mod curve;
pub mod revalue;
pub mod simulate;

use clap::ValueEnum;
use rates_core::market_data::TermStructure;
use rates_market::{MarketDataSimulator, Tick};
use serde::Serialize;
use tracing::info;

use crate::config::DeskConfig;
use crate::Result;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Simulator configured from `config`.
pub fn simulator(config: &DeskConfig) -> Result<MarketDataSimulator> {
    let sim = MarketDataSimulator::new(config.seed_term_structure()?)
        .with_params(config.simulator.clone());
    Ok(match config.rng_seed {
        Some(seed) => sim.with_rng_seed(seed),
        None => sim,
    })
}

/// Seed curve, curve after `ticks` ticks, and the ticks themselves.
pub struct MarketMove {
    /// Curve before any tick
    pub seed: TermStructure,
    /// Curve after the last tick
    pub current: TermStructure,
    /// Applied ticks
    pub ticks: Vec<Tick>,
}

/// Runs `ticks` simulator ticks from the configured seed.
pub fn simulate_move(config: &DeskConfig, ticks: usize) -> Result<MarketMove> {
    let mut sim = simulator(config)?;
    let seed = sim.curve().clone();
    let ticks = (0..ticks)
        .map(|_| sim.tick())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!(ticks = ticks.len(), "Simulated market move");
    Ok(MarketMove {
        seed,
        current: sim.curve().clone(),
        ticks,
    })
}

/// One tick as an output row.
#[derive(Debug, Clone, Serialize)]
pub struct TickRow {
    /// Tick number, from 1
    pub step: usize,
    /// Moved tenor
    pub tenor: String,
    /// Rate before the move
    pub previous: f64,
    /// Rate after the move
    pub rate: f64,
    /// Move in basis points
    pub change_bps: f64,
    /// Lower bound of the band
    pub lower: f64,
    /// Upper bound of the band
    pub upper: f64,
}

impl TickRow {
    /// Row for the `step`-th tick; `basis_point` is one bp in the curve unit.
    pub fn new(step: usize, tick: &Tick, basis_point: f64) -> Self {
        Self {
            step,
            tenor: tick.tenor.to_string(),
            previous: tick.previous,
            rate: tick.rate,
            change_bps: (tick.rate - tick.previous) / basis_point,
            lower: tick.band.0,
            upper: tick.band.1,
        }
    }
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::approx::assert_relative_eq;

    #[test]
    fn test_seeded_moves_are_reproducible() {
        let config = DeskConfig {
            rng_seed: Some(11),
            ..DeskConfig::default()
        };
        let a = simulate_move(&config, 20).unwrap();
        let b = simulate_move(&config, 20).unwrap();
        assert_eq!(a.current, b.current);
        assert_eq!(a.ticks.len(), 20);
        assert_eq!(a.seed, rates_market::usd_sofr_seed());
    }

    #[test]
    fn test_tick_row_change_in_bps() {
        let tick = Tick {
            tenor: "5Y".parse().unwrap(),
            previous: 0.04,
            rate: 0.0401,
            band: (0.039, 0.042),
        };
        let row = TickRow::new(1, &tick, 1e-4);
        assert_relative_eq!(row.change_bps, 1.0, epsilon = 1e-9);
        assert_eq!(row.tenor, "5Y");
    }
}
