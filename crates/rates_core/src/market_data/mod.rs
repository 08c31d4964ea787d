//! Market data: benchmark term structures, snapshots and curves.
//!
//! This module provides:
//! - [`TermStructure`]: ordered tenor → rate quotes with unit metadata
//! - [`MarketSnapshot`]: immutable, shareable copy of a term structure
//! - [`curves`]: discount curves and curve reports
//! - [`MarketDataError`]: structured error type

pub mod curves;
pub mod error;
pub mod snapshot;
pub mod term_structure;

pub use error::MarketDataError;
pub use snapshot::MarketSnapshot;
pub use term_structure::{RateUnit, TermPoint, TermStructure};
