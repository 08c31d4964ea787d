//! Core time, tenor and table types.
//!
//! This module provides:
//! - `time`: `Date` and `DayCountConvention`
//! - `tenor`: `Tenor` labels and their year-fraction ordering
//! - `cashflow`: `CashflowRow`, `FixingRow`, `FixingSeries`, `Leg`
//! - `swap`: `SwapDefinition` blotter rows
//! - `error`: `DateError`, `TenorError`, `RevalError`

pub mod cashflow;
pub mod error;
pub mod swap;
pub mod tenor;
pub mod time;

pub use cashflow::{total_npv, CashflowRow, FixingRow, FixingSeries, Leg};
pub use error::{DateError, RevalError, TenorError};
pub use swap::SwapDefinition;
pub use tenor::{Tenor, TenorUnit};
pub use time::{Date, DayCountConvention};
