//! # rates_session (L4: Session)
//!
//! One revaluation session per swap.
//!
//! A [`SwapContext`] binds a swap definition to a calibrated curve, builds
//! the sensitivity matrices once, and then answers "what if the quotes
//! moved to X" questions through first-order reprojection:
//!
//! - NPV and par rate ([`SwapContext::revalue`])
//! - per-tenor risk ([`SwapContext::get_risk`])
//! - a shocked replacement curve ([`SwapContext::get_shocked_curve`])
//! - fixed and floating cashflow tables
//! - period fixing tables, with only unfixed observations moved
//!
//! Pricing itself is delegated to a [`PricingBackend`](rates_core::traits::PricingBackend).
//! [`demo`] carries a small self-contained backend.

#![warn(missing_docs)]

mod context;
pub mod demo;
mod error;

pub use context::{Revaluation, SwapContext, SwapRisk, NPV_KEY};
pub use error::{ContextState, SessionError};
