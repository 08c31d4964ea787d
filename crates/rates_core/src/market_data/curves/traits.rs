//! Discount curve trait definition.

use crate::market_data::error::MarketDataError;
use crate::types::time::{Date, DayCountConvention};

/// Date-based discount curve.
///
/// # Contract
///
/// - `discount_factor(valuation_date()) == 1`
/// - `discount_factor(d)` fails for `d` before the valuation date
/// - `zero_rate(start, end)` is the simple rate over `[start, end]` under
///   the curve's day count: `(D(start) / D(end) - 1) / dcf(start, end)`
///
/// # Example
///
/// ```
/// use rates_core::market_data::curves::{DiscountCurve, NodeCurve};
/// use rates_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let one_year = Date::from_ymd(2025, 1, 2).unwrap();
/// let curve = NodeCurve::new(
///     "sofr",
///     today,
///     DayCountConvention::ActualActual360,
///     vec![(one_year, 0.95)],
/// )
/// .unwrap();
///
/// assert_eq!(curve.discount_factor(today).unwrap(), 1.0);
/// let rate = curve.zero_rate(today, one_year).unwrap();
/// assert!((rate - (1.0 / 0.95 - 1.0) / (366.0 / 360.0)).abs() < 1e-12);
/// ```
pub trait DiscountCurve {
    /// Valuation (anchor) date of the curve.
    fn valuation_date(&self) -> Date;

    /// Day count used to convert dates into year fractions.
    fn day_count(&self) -> DayCountConvention;

    /// Discount factor for a payment on `date`.
    fn discount_factor(&self, date: Date) -> Result<f64, MarketDataError>;

    /// Simple rate between `start` and `end`.
    fn zero_rate(&self, start: Date, end: Date) -> Result<f64, MarketDataError> {
        let df_start = self.discount_factor(start)?;
        let df_end = self.discount_factor(end)?;
        let dcf = self.day_count().year_fraction_dates(start, end);
        if dcf <= 0.0 {
            return Err(MarketDataError::InvalidMaturity {
                date: end,
                valuation_date: start,
            });
        }
        Ok((df_start / df_end - 1.0) / dcf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flat continuously-compounded curve for exercising the default method
    struct FlatCurve {
        anchor: Date,
        rate: f64,
    }

    impl DiscountCurve for FlatCurve {
        fn valuation_date(&self) -> Date {
            self.anchor
        }

        fn day_count(&self) -> DayCountConvention {
            DayCountConvention::ActualActual365
        }

        fn discount_factor(&self, date: Date) -> Result<f64, MarketDataError> {
            if date < self.anchor {
                return Err(MarketDataError::InvalidMaturity {
                    date,
                    valuation_date: self.anchor,
                });
            }
            let t = self.day_count().year_fraction_dates(self.anchor, date);
            Ok((-self.rate * t).exp())
        }
    }

    #[test]
    fn test_default_zero_rate() {
        let anchor = Date::from_ymd(2024, 1, 1).unwrap();
        let curve = FlatCurve { anchor, rate: 0.05 };
        let end = anchor.add_days(365).unwrap();
        let r = curve.zero_rate(anchor, end).unwrap();
        assert!((r - (0.05_f64.exp() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_default_zero_rate_rejects_empty_period() {
        let anchor = Date::from_ymd(2024, 1, 1).unwrap();
        let curve = FlatCurve { anchor, rate: 0.05 };
        assert!(matches!(
            curve.zero_rate(anchor, anchor),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
    }
}
