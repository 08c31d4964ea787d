//! # rates_market: Synthetic Benchmark Market Data
//!
//! ## Layer 2 (Market Data) Role
//!
//! rates_market produces correlated, shape-preserving moves of a
//! [`TermStructure`](rates_core::market_data::TermStructure) to drive the
//! incremental revaluation layers:
//! - [`SimulatorState`]: seed curve, current curve and AR(1) global factor
//! - [`tick`]: one-tenor move with neighbour-band clipping
//! - [`MarketDataSimulator`]: state + parameters + seeded RNG
//! - [`seed`]: the default USD SOFR seed curve
//!
//! ## Usage
//!
//! ```rust
//! use rates_market::{MarketDataSimulator, SimulatorParams};
//!
//! let mut sim = MarketDataSimulator::default()
//!     .with_rng_seed(2024)
//!     .with_params(SimulatorParams::default().with_sigma_bps(2.0));
//!
//! let moved = sim.tick().unwrap();
//! assert_eq!(sim.curve().rate(&moved.tenor), Some(moved.rate));
//! ```

#![deny(missing_docs)]

pub mod error;
pub mod seed;
pub mod simulator;

pub use error::SimulatorError;
pub use seed::usd_sofr_seed;
pub use simulator::{neighbor_band, tick, MarketDataSimulator, SimulatorParams, SimulatorState, Tick};
