//! Collaborator traits.
//!
//! - [`pricing`]: calibrator, instrument, solver and backend abstractions the
//!   revaluation layers consume as black boxes

pub mod pricing;

pub use pricing::{
    CurveCalibrator, DeltaSolver, DeltaTarget, PricingBackend, SwapInstrument,
};
