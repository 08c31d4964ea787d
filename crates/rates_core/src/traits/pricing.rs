//! External pricing collaborators.
//!
//! The revaluation engine does not calibrate curves, build schedules or
//! extract exact sensitivities itself. It consumes these abilities through
//! the traits below:
//!
//! - [`CurveCalibrator`]: full non-linear solve from quotes to a [`NodeCurve`]
//! - [`SwapInstrument`]: exact NPV, par rate, cashflow and fixing tables
//! - [`DeltaSolver`]: per-instrument sensitivity of a target quantity
//! - [`PricingBackend`]: factory tying solver and instrument construction to
//!   one curve and calibration set
//!
//! # Sign conventions
//!
//! - Deltas are ∂target/∂quote, with quotes measured in the solver's
//!   [`DeltaSolver::unit`].
//! - [`SwapInstrument::fixed_rate_risk`] is the NPV gained when the fixed
//!   rate *decreases* by one decimal unit (−∂NPV/∂K), so that
//!   `par ≈ K + NPV / fixed_rate_risk`.

use crate::market_data::curves::NodeCurve;
use crate::market_data::{RateUnit, TermStructure};
use crate::types::cashflow::{CashflowRow, FixingRow, FixingSeries, Leg};
use crate::types::error::RevalError;
use crate::types::swap::SwapDefinition;
use crate::types::tenor::Tenor;
use crate::types::time::Date;

/// Full curve calibration from benchmark quotes.
pub trait CurveCalibrator {
    /// Solves for a curve repricing `quotes` on `instruments`.
    fn calibrate(
        &self,
        valuation_date: Date,
        instruments: &[Tenor],
        quotes: &TermStructure,
    ) -> Result<NodeCurve, RevalError>;
}

/// A priced swap instrument.
pub trait SwapInstrument {
    /// Trade definition the instrument was built from.
    fn definition(&self) -> &SwapDefinition;

    /// Exact NPV on `curve`.
    fn npv(&self, curve: &NodeCurve) -> Result<f64, RevalError>;

    /// Exact par rate on `curve`.
    fn par_rate(&self, curve: &NodeCurve) -> Result<f64, RevalError>;

    /// NPV gained per unit decrease of the fixed rate (−∂NPV/∂K).
    fn fixed_rate_risk(&self, curve: &NodeCurve) -> Result<f64, RevalError>;

    /// Cashflow schedule of one leg.
    fn cashflows(&self, leg: Leg, curve: &NodeCurve) -> Result<Vec<CashflowRow>, RevalError>;

    /// Fixing table of one floating period.
    fn fixings_table(&self, period: usize, curve: &NodeCurve)
        -> Result<Vec<FixingRow>, RevalError>;
}

/// Quantity whose sensitivity is requested from a solver.
#[derive(Debug)]
pub enum DeltaTarget<'a, S: ?Sized> {
    /// Discount factor at a date on the solver's curve.
    DiscountFactor(Date),
    /// Swap NPV.
    Npv(&'a S),
    /// Period rate of one cashflow row.
    CashflowRate {
        /// Instrument
        swap: &'a S,
        /// Leg of the row
        leg: Leg,
        /// Row index within the leg's cashflow table
        row: usize,
    },
}

impl<S: ?Sized> DeltaTarget<'_, S> {
    /// Short human-readable label for logs and matrix row keys.
    pub fn describe(&self) -> String {
        match self {
            DeltaTarget::DiscountFactor(date) => format!("df:{}", date),
            DeltaTarget::Npv(_) => "npv".to_string(),
            DeltaTarget::CashflowRate { leg, row, .. } => format!("{}:rate:{}", leg, row),
        }
    }
}

/// Sensitivity extraction against calibration instruments.
pub trait DeltaSolver<S: ?Sized> {
    /// Calibration instrument labels, in quote order.
    fn instrument_labels(&self) -> Vec<String>;

    /// Unit of the quote moves the returned deltas refer to.
    fn unit(&self) -> RateUnit {
        RateUnit::Decimal
    }

    /// Sensitivity of `target` to each calibration instrument.
    fn delta(&self, target: DeltaTarget<'_, S>) -> Result<Vec<f64>, RevalError>;
}

/// Factory for solvers and instruments bound to one curve.
pub trait PricingBackend {
    /// Priced instrument type.
    type Swap: SwapInstrument;
    /// Solver type.
    type Solver: DeltaSolver<Self::Swap>;

    /// Builds the calibration solver for `curve` and its quotes.
    fn solver(
        &self,
        curve: &NodeCurve,
        calibration: &TermStructure,
    ) -> Result<Self::Solver, RevalError>;

    /// Builds the instrument for `definition`, with historical `fixings`.
    fn build_swap(
        &self,
        definition: &SwapDefinition,
        curve: &NodeCurve,
        fixings: &FixingSeries,
    ) -> Result<Self::Swap, RevalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    #[test]
    fn test_describe_targets() {
        let swap = Dummy;
        let date = Date::from_ymd(2025, 1, 2).unwrap();
        assert_eq!(DeltaTarget::<Dummy>::DiscountFactor(date).describe(), "df:2025-01-02");
        assert_eq!(DeltaTarget::Npv(&swap).describe(), "npv");
        assert_eq!(
            DeltaTarget::CashflowRate {
                swap: &swap,
                leg: Leg::Float,
                row: 3
            }
            .describe(),
            "float:rate:3"
        );
    }
}
