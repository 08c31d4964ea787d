//! # rates_core: Foundation for Incremental Swap Revaluation
//!
//! ## Layer 1 (Foundation) Role
//!
//! rates_core is the bottom layer of the workspace, providing:
//! - Time types: `Date`, `DayCountConvention` (`types::time`)
//! - Tenor labels and ordering: `Tenor` (`types::tenor`)
//! - Cashflow, fixing and swap definition rows (`types::cashflow`, `types::swap`)
//! - Benchmark quotes: `TermStructure`, `MarketSnapshot` (`market_data`)
//! - Calibrated curves: `NodeCurve`, curve reports (`market_data::curves`)
//! - Collaborator traits for calibrators, solvers and swaps (`traits`)
//! - Error types: `RevalError`, `MarketDataError`, `TenorError`, `DateError`
//!
//! ## Unit Convention
//!
//! Rates are stored as decimals (0.053 = 5.3%). Anything expressed in
//! percent or basis points carries a [`market_data::RateUnit`] tag and is
//! converted at the boundary.
//!
//! ## Usage Examples
//!
//! ```rust
//! use rates_core::market_data::TermStructure;
//! use rates_core::types::{Date, Tenor};
//!
//! let curve = TermStructure::from_percent(&[("1Y", 5.0), ("2Y", 6.0), ("5Y", 7.0)]).unwrap();
//! assert_eq!(curve.len(), 3);
//!
//! let spot = Date::from_ymd(2024, 3, 15).unwrap();
//! let five_y: Tenor = "5Y".parse().unwrap();
//! assert_eq!(spot.add_tenor(five_y).unwrap(), Date::from_ymd(2029, 3, 15).unwrap());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod traits;
pub mod types;

pub use types::error::RevalError;
