//! Sensitivity matrices.
//!
//! - [`SensitivityMatrix`]: row-keyed Jacobian over benchmark tenors
//! - [`SensitivityMatrixBuilder`]: stacks external solver deltas with shape checks

mod builder;
mod matrix;

pub use builder::SensitivityMatrixBuilder;
pub use matrix::SensitivityMatrix;
