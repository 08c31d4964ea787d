//! Discount curves.
//!
//! - [`DiscountCurve`]: date-based discount factor / rate trait
//! - [`NodeCurve`]: log-linear node curve handed over by a calibrator
//! - [`curve_points`], [`forward_strip`]: per-tenor curve reports

mod node;
mod report;
mod traits;

pub use node::{CurveNode, NodeCurve};
pub use report::{curve_points, forward_strip, CurvePoint, ForwardPoint};
pub use traits::DiscountCurve;
