//! # rates_risk (L3: Risk)
//!
//! Sensitivity matrices and first-order incremental revaluation.
//!
//! This crate provides:
//! - Sensitivity matrices stacked from external solver deltas
//! - Change vectors between a baseline and a shocked term structure
//! - `reprice`: `new = baseline + M · Δ` for scalars, vectors and keyed tables
//! - Par rates with a zero-risk guard
//! - Rayon-parallel blotter approximation
//! - Counterparty cashflow buckets and tenor-ordered risk series
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             rates_risk (L3)             │
//! ├─────────────────────────────────────────┤
//! │  sensitivity/ - Matrix, Builder         │
//! │  revaluation/ - ChangeVector, reprice,  │
//! │                 par rate, blotter       │
//! │  buckets      - counterparty buckets    │
//! │  risk_series  - exposures, DV01         │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │             rates_core (L1)             │
//! │  TermStructure, traits, RevalError      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Units
//!
//! Change vectors are always decimal. A matrix declares the unit of quote
//! move its columns refer to, and the change is rescaled into that unit
//! before the product.
//!
//! ## Example
//!
//! ```
//! use rates_core::market_data::{RateUnit, TermStructure};
//! use rates_risk::{reprice, ChangeVector, SensitivityMatrix, Valuation};
//!
//! let baseline = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06), ("5Y", 0.07)]).unwrap();
//! let shocked = TermStructure::from_labels(&[("1Y", 0.051), ("2Y", 0.06), ("5Y", 0.0695)]).unwrap();
//! let change = ChangeVector::diff(&baseline, &shocked);
//!
//! let npv_risk = SensitivityMatrix::new(
//!     vec!["npv".into()],
//!     baseline.labels(),
//!     RateUnit::Decimal,
//!     vec![vec![100.0, 200.0, 50.0]],
//! )
//! .unwrap();
//!
//! let npv = reprice(&Valuation::Scalar(1000.0), Some(&npv_risk), &change).unwrap();
//! assert!((npv.as_scalar().unwrap() - 1000.075).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod buckets;
pub mod revaluation;
pub mod risk_series;
pub mod sensitivity;

pub use revaluation::{
    par_rate, reprice, reprice_blotter, reprice_swap, BlotterRisk, BlotterValuation, ChangeVector,
    RiskRow, SwapQuote, SwapValuation, Valuation,
};
pub use risk_series::{RiskExposure, RiskSeries};
pub use sensitivity::{SensitivityMatrix, SensitivityMatrixBuilder};
