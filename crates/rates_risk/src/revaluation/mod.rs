//! Incremental revaluation.
//!
//! - [`ChangeVector`]: aligned quote changes in decimal units
//! - [`reprice`]: `baseline + M · Δ` over [`Valuation`] variants
//! - [`par_rate`]: par rate from a repriced NPV with a zero-risk guard
//! - [`blotter`]: parallel approximation of many swaps at once

pub mod blotter;
mod change;
mod engine;

pub use blotter::{reprice_blotter, BlotterRisk, BlotterValuation, RiskRow, SwapQuote};
pub use change::ChangeVector;
pub use engine::{
    guard_denominator, par_rate, reprice, reprice_swap, SwapValuation, Valuation, RISK_EPSILON,
};
