//! Node-based discount curve produced by an external calibrator.
//!
//! A [`NodeCurve`] holds discount factors at calibration node dates and
//! interpolates log-linearly in time (constant forward between nodes).
//! It is also the carrier for shocked curves: replacing the node discount
//! factors yields a hypothetical curve without re-solving.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::DiscountCurve;
use crate::market_data::error::MarketDataError;
use crate::types::time::{Date, DayCountConvention};

/// One curve node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    /// Node date
    pub date: Date,
    /// Discount factor at the node
    pub discount_factor: f64,
}

/// Log-linear discount factor curve anchored at a valuation date.
///
/// The valuation-date node (discount factor 1) is implicit; the remaining
/// nodes are the calibration nodes and are the rows of the curve-node delta
/// matrix.
///
/// # Example
///
/// ```
/// use rates_core::market_data::curves::{DiscountCurve, NodeCurve};
/// use rates_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let curve = NodeCurve::new(
///     "sofr",
///     today,
///     DayCountConvention::ActualActual360,
///     vec![
///         (Date::from_ymd(2025, 1, 1).unwrap(), 0.95),
///         (Date::from_ymd(2026, 1, 1).unwrap(), 0.90),
///     ],
/// )
/// .unwrap();
///
/// let blob = curve.to_blob().unwrap();
/// let restored = NodeCurve::from_blob(&blob).unwrap();
/// assert_eq!(curve, restored);
///
/// let mid = Date::from_ymd(2025, 7, 2).unwrap();
/// let df = curve.discount_factor(mid).unwrap();
/// assert!(df < 0.95 && df > 0.90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCurve {
    id: String,
    valuation_date: Date,
    day_count: DayCountConvention,
    nodes: Vec<CurveNode>,
}

impl NodeCurve {
    /// Builds a curve from calibration nodes after the valuation date.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if no node is given
    /// - `UnorderedNodes` if dates are not strictly increasing after
    ///   `valuation_date`
    /// - `InvalidDiscountFactor` for non-positive or non-finite values
    pub fn new(
        id: impl Into<String>,
        valuation_date: Date,
        day_count: DayCountConvention,
        nodes: Vec<(Date, f64)>,
    ) -> Result<Self, MarketDataError> {
        if nodes.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }

        let mut previous = valuation_date;
        for (date, df) in &nodes {
            if *date <= previous {
                return Err(MarketDataError::UnorderedNodes { date: *date });
            }
            validate_df(*date, *df)?;
            previous = *date;
        }

        Ok(Self {
            id: id.into(),
            valuation_date,
            day_count,
            nodes: nodes
                .into_iter()
                .map(|(date, discount_factor)| CurveNode {
                    date,
                    discount_factor,
                })
                .collect(),
        })
    }

    /// Curve identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Calibration nodes (valuation-date node excluded).
    pub fn nodes(&self) -> &[CurveNode] {
        &self.nodes
    }

    /// Calibration node dates.
    pub fn node_dates(&self) -> Vec<Date> {
        self.nodes.iter().map(|n| n.date).collect()
    }

    /// Calibration node discount factors.
    pub fn node_discount_factors(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.discount_factor).collect()
    }

    /// Returns a replacement curve with new node discount factors.
    ///
    /// Dates, day count and id are preserved; `dfs` must align one-to-one
    /// with [`NodeCurve::node_dates`].
    pub fn with_node_discount_factors(&self, dfs: &[f64]) -> Result<Self, MarketDataError> {
        if dfs.len() != self.nodes.len() {
            return Err(MarketDataError::InsufficientData {
                got: dfs.len(),
                need: self.nodes.len(),
            });
        }
        let nodes = self
            .nodes
            .iter()
            .zip(dfs)
            .map(|(node, df)| {
                validate_df(node.date, *df)?;
                Ok(CurveNode {
                    date: node.date,
                    discount_factor: *df,
                })
            })
            .collect::<Result<Vec<_>, MarketDataError>>()?;

        debug!(curve = %self.id, nodes = nodes.len(), "Replaced node discount factors");
        Ok(Self {
            id: self.id.clone(),
            valuation_date: self.valuation_date,
            day_count: self.day_count,
            nodes,
        })
    }

    /// Serialises the curve into an opaque JSON blob.
    pub fn to_blob(&self) -> Result<String, MarketDataError> {
        serde_json::to_string(self).map_err(|e| MarketDataError::Blob(e.to_string()))
    }

    /// Restores a curve from a blob produced by [`NodeCurve::to_blob`].
    pub fn from_blob(blob: &str) -> Result<Self, MarketDataError> {
        let curve: NodeCurve =
            serde_json::from_str(blob).map_err(|e| MarketDataError::Blob(e.to_string()))?;
        debug!(curve = %curve.id, nodes = curve.nodes.len(), "Restoring curve from blob");
        // Re-run construction checks on foreign input
        Self::new(
            curve.id,
            curve.valuation_date,
            curve.day_count,
            curve
                .nodes
                .into_iter()
                .map(|n| (n.date, n.discount_factor))
                .collect(),
        )
    }

    fn time(&self, date: Date) -> f64 {
        self.day_count.year_fraction_dates(self.valuation_date, date)
    }
}

fn validate_df(date: Date, value: f64) -> Result<(), MarketDataError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MarketDataError::InvalidDiscountFactor { date, value });
    }
    Ok(())
}

impl DiscountCurve for NodeCurve {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    fn discount_factor(&self, date: Date) -> Result<f64, MarketDataError> {
        if date < self.valuation_date {
            return Err(MarketDataError::InvalidMaturity {
                date,
                valuation_date: self.valuation_date,
            });
        }
        if date == self.valuation_date {
            return Ok(1.0);
        }

        let t = self.time(date);
        let mut left = (0.0_f64, 0.0_f64); // (time, ln df)
        for (i, node) in self.nodes.iter().enumerate() {
            let right = (self.time(node.date), node.discount_factor.ln());
            let is_last = i + 1 == self.nodes.len();
            if t <= right.0 || is_last {
                // Beyond the last node the final segment is extended
                let w = (t - left.0) / (right.0 - left.0);
                return Ok((left.1 + w * (right.1 - left.1)).exp());
            }
            left = right;
        }

        // nodes is never empty after construction
        Err(MarketDataError::InsufficientData { got: 0, need: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn curve() -> NodeCurve {
        NodeCurve::new(
            "sofr",
            d(2024, 1, 1),
            DayCountConvention::ActualActual360,
            vec![(d(2025, 1, 1), 0.95), (d(2026, 1, 1), 0.90)],
        )
        .unwrap()
    }

    #[test]
    fn test_node_values_recovered() {
        let c = curve();
        assert_relative_eq!(c.discount_factor(d(2025, 1, 1)).unwrap(), 0.95, epsilon = 1e-14);
        assert_relative_eq!(c.discount_factor(d(2026, 1, 1)).unwrap(), 0.90, epsilon = 1e-14);
        assert_eq!(c.discount_factor(d(2024, 1, 1)).unwrap(), 1.0);
    }

    #[test]
    fn test_log_linear_between_nodes() {
        let c = curve();
        let t1 = 366.0 / 360.0;
        let t2 = 731.0 / 360.0;
        let date = d(2025, 7, 1);
        let t = (date - d(2024, 1, 1)) as f64 / 360.0;
        let w = (t - t1) / (t2 - t1);
        let expected = (0.95_f64.ln() * (1.0 - w) + 0.90_f64.ln() * w).exp();
        assert_relative_eq!(c.discount_factor(date).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_extrapolation_extends_last_segment() {
        let c = curve();
        let far = c.discount_factor(d(2027, 1, 1)).unwrap();
        assert!(far < 0.90);
    }

    #[test]
    fn test_before_valuation_rejected() {
        assert!(matches!(
            curve().discount_factor(d(2023, 12, 31)),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
    }

    #[test]
    fn test_construction_checks() {
        let anchor = d(2024, 1, 1);
        let dc = DayCountConvention::ActualActual360;
        assert!(matches!(
            NodeCurve::new("x", anchor, dc, vec![]),
            Err(MarketDataError::InsufficientData { .. })
        ));
        assert!(matches!(
            NodeCurve::new("x", anchor, dc, vec![(d(2025, 1, 1), 0.9), (d(2024, 6, 1), 0.95)]),
            Err(MarketDataError::UnorderedNodes { .. })
        ));
        assert!(matches!(
            NodeCurve::new("x", anchor, dc, vec![(d(2025, 1, 1), -0.1)]),
            Err(MarketDataError::InvalidDiscountFactor { .. })
        ));
        assert!(matches!(
            NodeCurve::new("x", anchor, dc, vec![(anchor, 1.0)]),
            Err(MarketDataError::UnorderedNodes { .. })
        ));
    }

    #[test]
    fn test_with_node_discount_factors() {
        let c = curve();
        let shocked = c.with_node_discount_factors(&[0.951, 0.899]).unwrap();
        assert_eq!(shocked.node_dates(), c.node_dates());
        assert_eq!(shocked.node_discount_factors(), vec![0.951, 0.899]);
        assert!(c.with_node_discount_factors(&[0.95]).is_err());
        assert!(c.with_node_discount_factors(&[0.95, f64::NAN]).is_err());
    }

    #[test]
    fn test_blob_rejects_garbage() {
        assert!(matches!(
            NodeCurve::from_blob("not json"),
            Err(MarketDataError::Blob(_))
        ));
    }
}
