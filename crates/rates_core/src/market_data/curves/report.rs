//! Curve point reports per benchmark tenor.
//!
//! These are the tables a desk UI shows next to the market data: discount
//! factor and zero rate at each benchmark maturity, and an overnight forward
//! strip. They work on any [`DiscountCurve`], so the same report can be
//! produced for a calibrated curve and for a shocked replacement.

use serde::Serialize;

use super::traits::DiscountCurve;
use crate::market_data::error::MarketDataError;
use crate::types::tenor::Tenor;
use crate::types::time::Date;

/// Discount factor and zero rate at one benchmark maturity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Benchmark tenor label
    pub term: String,
    /// Unadjusted maturity date
    pub maturity: Date,
    /// Discount factor at maturity
    pub discount_factor: f64,
    /// Simple zero rate from valuation date to maturity
    pub zero_rate: f64,
}

/// One-day forward rate ending at a benchmark maturity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardPoint {
    /// "ON" for the first point, else the benchmark tenor label
    pub term: String,
    /// Days from valuation date to the start of the forward period
    pub days: i64,
    /// Simple one-day forward rate
    pub forward_rate: f64,
}

/// Discount factor and zero rate at each tenor's maturity.
pub fn curve_points<C: DiscountCurve>(
    curve: &C,
    tenors: &[Tenor],
) -> Result<Vec<CurvePoint>, MarketDataError> {
    let anchor = curve.valuation_date();
    tenors
        .iter()
        .map(|tenor| {
            let maturity = anchor.add_tenor(*tenor)?;
            Ok(CurvePoint {
                term: tenor.to_string(),
                maturity,
                discount_factor: curve.discount_factor(maturity)?,
                zero_rate: curve.zero_rate(anchor, maturity)?,
            })
        })
        .collect()
}

/// Overnight forward strip: an "ON" point at the valuation date followed by
/// the one-day forward ending at each tenor's maturity.
pub fn forward_strip<C: DiscountCurve>(
    curve: &C,
    tenors: &[Tenor],
) -> Result<Vec<ForwardPoint>, MarketDataError> {
    let anchor = curve.valuation_date();
    let mut out = Vec::with_capacity(tenors.len() + 1);
    out.push(ForwardPoint {
        term: "ON".to_string(),
        days: 0,
        forward_rate: curve.zero_rate(anchor, anchor.add_days(1)?)?,
    });

    for tenor in tenors {
        let maturity = anchor.add_tenor(*tenor)?;
        let start = maturity.add_days(-1)?;
        out.push(ForwardPoint {
            term: tenor.to_string(),
            days: start - anchor,
            forward_rate: curve.zero_rate(start, maturity)?,
        });
    }
    Ok(out)
}
