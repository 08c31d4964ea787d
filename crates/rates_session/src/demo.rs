//! Demo pricing backend.
//!
//! A small, self-contained implementation of the collaborator traits so a
//! [`SwapContext`](crate::SwapContext) can run end to end without an
//! external analytics library:
//!
//! - [`FlatForwardCalibrator`]: one node per benchmark tenor with
//!   `df = exp(−r·t)` (continuously compounded zero rate, ACT/365 time)
//! - [`DemoSolver`]: central-difference bump-and-recalibrate deltas
//! - [`DemoSwap`]: annual fixed vs annual simple-forward floating legs,
//!   ACT/360 accruals, weekly fixing observations
//!
//! Curve nodes are the unadjusted tenor maturities; there is no calendar.
//!
//! # Example
//!
//! ```
//! use rates_core::market_data::curves::DiscountCurve;
//! use rates_core::market_data::TermStructure;
//! use rates_core::traits::CurveCalibrator;
//! use rates_core::types::Date;
//! use rates_session::demo::FlatForwardCalibrator;
//!
//! let quotes = TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.05)]).unwrap();
//! let today = Date::from_ymd(2025, 1, 1).unwrap();
//! let curve = FlatForwardCalibrator.calibrate(today, &quotes.tenors(), &quotes).unwrap();
//!
//! let one_y = Date::from_ymd(2026, 1, 1).unwrap();
//! assert!((curve.discount_factor(one_y).unwrap() - (-0.05f64).exp()).abs() < 1e-12);
//! ```

use rates_core::market_data::curves::{DiscountCurve, NodeCurve};
use rates_core::market_data::{RateUnit, TermStructure};
use rates_core::traits::{
    CurveCalibrator, DeltaSolver, DeltaTarget, PricingBackend, SwapInstrument,
};
use rates_core::types::{
    CashflowRow, Date, DayCountConvention, FixingRow, FixingSeries, Leg, SwapDefinition, Tenor,
};
use rates_core::RevalError;

/// Default quote bump for finite-difference deltas (decimal).
pub const DEFAULT_BUMP: f64 = 1e-6;

/// Days between two fixing observations.
const OBSERVATION_STEP_DAYS: i64 = 7;

/// Calibrates one node per tenor from continuously compounded zero rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatForwardCalibrator;

impl CurveCalibrator for FlatForwardCalibrator {
    fn calibrate(
        &self,
        valuation_date: Date,
        instruments: &[Tenor],
        quotes: &TermStructure,
    ) -> Result<NodeCurve, RevalError> {
        if instruments.is_empty() {
            return Err(RevalError::EmptyCalibration);
        }
        let quotes = quotes.to_unit(RateUnit::Decimal);
        let time = DayCountConvention::ActualActual365;

        let nodes = instruments
            .iter()
            .map(|tenor| {
                let rate = quotes.rate(tenor).ok_or_else(|| RevalError::MissingSensitivity {
                    key: tenor.to_string(),
                })?;
                let maturity = valuation_date.add_tenor(*tenor)?;
                let t = time.year_fraction_dates(valuation_date, maturity);
                Ok((maturity, (-rate * t).exp()))
            })
            .collect::<Result<Vec<_>, RevalError>>()?;

        Ok(NodeCurve::new("demo", valuation_date, time, nodes)?)
    }
}

/// Backend wiring [`FlatForwardCalibrator`], [`DemoSolver`] and [`DemoSwap`].
#[derive(Debug, Clone, Copy)]
pub struct DemoBackend {
    bump: f64,
}

impl DemoBackend {
    /// Backend with the default bump.
    pub fn new() -> Self {
        Self { bump: DEFAULT_BUMP }
    }

    /// Overrides the finite-difference bump.
    pub fn with_bump(mut self, bump: f64) -> Self {
        self.bump = bump;
        self
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingBackend for DemoBackend {
    type Swap = DemoSwap;
    type Solver = DemoSolver;

    fn solver(
        &self,
        curve: &NodeCurve,
        calibration: &TermStructure,
    ) -> Result<Self::Solver, RevalError> {
        if calibration.is_empty() {
            return Err(RevalError::EmptyCalibration);
        }
        Ok(DemoSolver {
            valuation_date: curve.valuation_date(),
            quotes: calibration.to_unit(RateUnit::Decimal),
            bump: self.bump,
        })
    }

    fn build_swap(
        &self,
        definition: &SwapDefinition,
        _curve: &NodeCurve,
        fixings: &FixingSeries,
    ) -> Result<Self::Swap, RevalError> {
        DemoSwap::new(definition.clone(), fixings.clone())
    }
}

/// Bump-and-recalibrate delta solver.
#[derive(Debug, Clone)]
pub struct DemoSolver {
    valuation_date: Date,
    quotes: TermStructure,
    bump: f64,
}

impl DemoSolver {
    fn curve_with(&self, index: usize, shift: f64) -> Result<NodeCurve, RevalError> {
        let mut quotes = self.quotes.clone();
        let rate = quotes.rates()[index];
        quotes.set_rate_at(index, rate + shift);
        FlatForwardCalibrator.calibrate(self.valuation_date, &quotes.tenors(), &quotes)
    }

    fn evaluate(
        &self,
        target: &DeltaTarget<'_, DemoSwap>,
        curve: &NodeCurve,
    ) -> Result<f64, RevalError> {
        match target {
            DeltaTarget::DiscountFactor(date) => Ok(curve.discount_factor(*date)?),
            DeltaTarget::Npv(swap) => swap.npv(curve),
            DeltaTarget::CashflowRate { swap, leg, row } => {
                let rows = swap.cashflows(*leg, curve)?;
                rows.get(*row)
                    .map(|r| r.rate)
                    .ok_or_else(|| RevalError::collaborator(format!("no {} row {}", leg, row)))
            }
        }
    }
}

impl DeltaSolver<DemoSwap> for DemoSolver {
    fn instrument_labels(&self) -> Vec<String> {
        self.quotes.labels()
    }

    fn delta(&self, target: DeltaTarget<'_, DemoSwap>) -> Result<Vec<f64>, RevalError> {
        (0..self.quotes.len())
            .map(|i| {
                let up = self.evaluate(&target, &self.curve_with(i, self.bump)?)?;
                let down = self.evaluate(&target, &self.curve_with(i, -self.bump)?)?;
                Ok((up - down) / (2.0 * self.bump))
            })
            .collect()
    }
}

/// Fixed-vs-floating swap with annual periods on both legs.
///
/// A positive notional pays fixed. Floating periods that started before the
/// valuation date use the historical fixing on their start date when one is
/// available.
#[derive(Debug, Clone)]
pub struct DemoSwap {
    definition: SwapDefinition,
    fixings: FixingSeries,
    periods: Vec<(Date, Date)>,
    day_count: DayCountConvention,
}

impl DemoSwap {
    /// Builds the annual schedule of `definition`.
    pub fn new(definition: SwapDefinition, fixings: FixingSeries) -> Result<Self, RevalError> {
        if definition.termination_date <= definition.start_date {
            return Err(RevalError::collaborator(format!(
                "swap {} terminates on or before its start",
                definition.id
            )));
        }

        let mut periods = Vec::new();
        let mut start = definition.start_date;
        let mut k = 1u32;
        while start < definition.termination_date {
            let end = definition
                .start_date
                .add_months(12 * k)?
                .min(definition.termination_date);
            periods.push((start, end));
            start = end;
            k += 1;
        }

        Ok(Self {
            definition,
            fixings,
            periods,
            day_count: DayCountConvention::ActualActual360,
        })
    }

    /// Accrual periods `(start, end)`; payment is on `end`.
    pub fn periods(&self) -> &[(Date, Date)] {
        &self.periods
    }

    fn discount(&self, curve: &NodeCurve, date: Date) -> Result<f64, RevalError> {
        if date < curve.valuation_date() {
            return Ok(0.0);
        }
        Ok(curve.discount_factor(date)?)
    }

    fn forward(&self, curve: &NodeCurve, start: Date, end: Date) -> Result<f64, RevalError> {
        let anchor = curve.valuation_date();
        let from = start.max(anchor);
        if end <= from {
            return Ok(0.0);
        }
        let tau = self.day_count.year_fraction_dates(from, end);
        Ok((curve.discount_factor(from)? / curve.discount_factor(end)? - 1.0) / tau)
    }

    fn historical(&self, date: Date) -> Option<f64> {
        self.fixings
            .iter()
            .rev()
            .find(|(d, _)| *d <= date)
            .map(|(_, r)| *r)
    }

    fn float_rate(&self, curve: &NodeCurve, start: Date, end: Date) -> Result<f64, RevalError> {
        if start < curve.valuation_date() {
            if let Some(fixing) = self.historical(start) {
                return Ok(fixing);
            }
        }
        self.forward(curve, start, end)
    }
}

impl SwapInstrument for DemoSwap {
    fn definition(&self) -> &SwapDefinition {
        &self.definition
    }

    fn npv(&self, curve: &NodeCurve) -> Result<f64, RevalError> {
        let anchor = curve.valuation_date();
        let mut total = 0.0;
        for leg in [Leg::Fixed, Leg::Float] {
            total += self
                .cashflows(leg, curve)?
                .iter()
                .filter(|r| r.payment_date > anchor)
                .map(|r| r.npv)
                .sum::<f64>();
        }
        Ok(total)
    }

    fn par_rate(&self, curve: &NodeCurve) -> Result<f64, RevalError> {
        Ok(rates_risk::par_rate(
            self.definition.fixed_rate,
            self.npv(curve)?,
            self.fixed_rate_risk(curve)?,
        ))
    }

    fn fixed_rate_risk(&self, curve: &NodeCurve) -> Result<f64, RevalError> {
        let anchor = curve.valuation_date();
        let mut annuity = 0.0;
        for (start, end) in &self.periods {
            if *end > anchor {
                let tau = self.day_count.year_fraction_dates(*start, *end);
                annuity += tau * self.discount(curve, *end)?;
            }
        }
        Ok(self.definition.notional * annuity)
    }

    fn cashflows(&self, leg: Leg, curve: &NodeCurve) -> Result<Vec<CashflowRow>, RevalError> {
        let notional = match leg {
            Leg::Fixed => -self.definition.notional,
            Leg::Float => self.definition.notional,
        };
        self.periods
            .iter()
            .map(|(start, end)| {
                let rate = match leg {
                    Leg::Fixed => self.definition.fixed_rate,
                    Leg::Float => self.float_rate(curve, *start, *end)?,
                };
                let mut row = CashflowRow {
                    accrual_start: *start,
                    accrual_end: *end,
                    payment_date: *end,
                    accrual_fraction: self.day_count.year_fraction_dates(*start, *end),
                    notional,
                    discount_factor: 0.0,
                    rate: 0.0,
                    cashflow: 0.0,
                    npv: 0.0,
                };
                row.reprice(self.discount(curve, *end)?, rate);
                Ok(row)
            })
            .collect()
    }

    fn fixings_table(
        &self,
        period: usize,
        curve: &NodeCurve,
    ) -> Result<Vec<FixingRow>, RevalError> {
        let (start, end) = *self.periods.get(period).ok_or_else(|| {
            RevalError::collaborator(format!(
                "period {} out of range ({} periods)",
                period,
                self.periods.len()
            ))
        })?;
        let anchor = curve.valuation_date();
        let payment_df = self.discount(curve, end)?;

        let mut rows = Vec::new();
        let mut obs = start;
        while obs < end {
            let next = obs.add_days(OBSERVATION_STEP_DAYS)?.min(end);
            let accrual_fraction = self.day_count.year_fraction_dates(obs, next);
            let fixed = obs < anchor;
            let rate = match (fixed, self.fixings.get(obs)) {
                (true, Some(r)) => r,
                (true, None) => self.historical(obs).unwrap_or(0.0),
                (false, _) => self.forward(curve, obs, next)?,
            };
            let hedging_notional = if fixed {
                0.0
            } else {
                self.definition.notional * accrual_fraction * payment_df
            };
            rows.push(FixingRow {
                observation_date: obs,
                accrual_fraction,
                hedging_notional,
                rate,
                risk: hedging_notional * 1e-4,
            });
            obs = next;
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn quotes() -> TermStructure {
        TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.05), ("5Y", 0.05)]).unwrap()
    }

    fn curve() -> NodeCurve {
        let q = quotes();
        FlatForwardCalibrator.calibrate(d(2025, 1, 1), &q.tenors(), &q).unwrap()
    }

    fn swap() -> DemoSwap {
        let def = SwapDefinition::new("S", d(2025, 1, 1), d(2028, 1, 1), 1_000_000.0, 0.05);
        DemoSwap::new(def, FixingSeries::default()).unwrap()
    }

    #[test]
    fn test_calibrated_curve_reports_act365_rates() {
        let curve = curve();
        assert_eq!(curve.day_count(), DayCountConvention::ActualActual365);

        // 2025-01-01 to 2026-01-01 is 365 days, one year on ACT/365
        let simple = curve.zero_rate(d(2025, 1, 1), d(2026, 1, 1)).unwrap();
        assert_relative_eq!(simple, 0.05f64.exp() - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_annual_schedule() {
        let def = SwapDefinition::new("S", d(2025, 1, 31), d(2027, 7, 31), 1.0, 0.05);
        let swap = DemoSwap::new(def, FixingSeries::default()).unwrap();
        assert_eq!(
            swap.periods(),
            &[
                (d(2025, 1, 31), d(2026, 1, 31)),
                (d(2026, 1, 31), d(2027, 1, 31)),
                (d(2027, 1, 31), d(2027, 7, 31)),
            ]
        );
    }

    #[test]
    fn test_par_rate_zeroes_npv() {
        let c = curve();
        let s = swap();
        let par = s.par_rate(&c).unwrap();
        let mut def = s.definition().clone();
        def.fixed_rate = par;
        let at_par = DemoSwap::new(def, FixingSeries::default()).unwrap();
        assert_relative_eq!(at_par.npv(&c).unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_npv_delta_matches_bump() {
        let c = curve();
        let s = swap();
        let solver = DemoBackend::new().solver(&c, &quotes()).unwrap();
        let deltas = solver.delta(DeltaTarget::Npv(&s)).unwrap();
        assert_eq!(deltas.len(), 3);
        // Receiving float: NPV rises with rates
        assert!(deltas.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn test_seasoned_period_uses_fixing() {
        let def = SwapDefinition::new("S", d(2024, 7, 1), d(2026, 7, 1), 1.0, 0.05);
        let fixings = FixingSeries::new(vec![(d(2024, 7, 1), 0.0531)]);
        let s = DemoSwap::new(def, fixings).unwrap();
        let rows = s.cashflows(Leg::Float, &curve()).unwrap();
        assert_eq!(rows[0].rate, 0.0531);
    }

    #[test]
    fn test_fixings_table_weekly() {
        let rows = swap().fixings_table(0, &curve()).unwrap();
        assert_eq!(rows[0].observation_date, d(2025, 1, 1));
        assert_eq!(rows[1].observation_date, d(2025, 1, 8));
        assert!(rows.iter().all(|r| r.rate > 0.0 && r.hedging_notional > 0.0));
        assert!(swap().fixings_table(9, &curve()).is_err());
    }
}
