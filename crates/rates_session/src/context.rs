//! Per-swap revaluation session.
//!
//! A [`SwapContext`] owns everything needed to approximate one swap under
//! hypothetical market moves: the calibrated curve and its quotes, a delta
//! solver, and the baseline NPV, cashflow tables and sensitivity matrices.
//!
//! # Lifecycle
//!
//! ```text
//! UNINITIALIZED ──set_context──▶ CONTEXT_SET ──set_fixings──▶ HYDRATED ──revalue──▶ REVALUED
//!                                     ▲                            │                   │
//!                                     └──── update_curve / update_calibration ─────────┘
//!                                           (rebuild matrices, re-enter REVALUED)
//! ```
//!
//! - `CONTEXT_SET` builds the solver and the curve-node delta matrix.
//! - `HYDRATED` builds the instrument, the baseline NPV and par rate, the
//!   base cashflow tables and the per-leg matrices.
//! - Later market moves are applied through [`reprice`] against those
//!   baselines; the instrument is only rebuilt when the curve or the
//!   calibration set changes.
//!
//! Every operation validates and builds its result before touching the
//! session, so a failed call leaves the previous state in place.

use std::fmt;

use rates_core::market_data::curves::{DiscountCurve, NodeCurve};
use rates_core::market_data::TermStructure;
use rates_core::traits::{
    CurveCalibrator, DeltaSolver, DeltaTarget, PricingBackend, SwapInstrument,
};
use rates_core::types::{CashflowRow, Date, FixingRow, FixingSeries, Leg, SwapDefinition};
use rates_core::RevalError;
use rates_risk::{
    reprice, reprice_swap, ChangeVector, RiskSeries, SensitivityMatrix, SensitivityMatrixBuilder,
    Valuation,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ContextState, SessionError};

/// Row key of the NPV sensitivity.
pub const NPV_KEY: &str = "npv";

/// Outcome of one revaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revaluation {
    /// Approximate NPV
    pub npv: f64,
    /// Approximate par rate (decimal)
    pub par_rate: f64,
    /// NPV move from the baseline
    pub npv_change: f64,
    /// Quote change that produced it
    pub change: ChangeVector,
}

/// Risk view of the hydrated swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRisk {
    /// NPV (latest revaluation, or baseline)
    pub npv: f64,
    /// Par rate (latest revaluation, or baseline)
    pub par_rate: f64,
    /// NPV gained per unit decrease of the fixed rate
    pub fixed_rate_risk: f64,
    /// Per-tenor NPV change for a one basis point quote move
    pub series: RiskSeries,
}

struct MarketContext<D> {
    definition: SwapDefinition,
    curve: NodeCurve,
    calibration: TermStructure,
    solver: D,
    builder: SensitivityMatrixBuilder,
    curve_matrix: SensitivityMatrix,
}

impl<D> MarketContext<D> {
    fn valuation_date(&self) -> Date {
        self.curve.valuation_date()
    }

    fn change_to(&self, market: &TermStructure) -> ChangeVector {
        ChangeVector::diff(&self.calibration, market)
    }
}

struct LegBaseline {
    rows: Vec<CashflowRow>,
    df_matrix: SensitivityMatrix,
    rate_matrix: Option<SensitivityMatrix>,
}

impl LegBaseline {
    fn build<S, D>(swap: &S, leg: Leg, market: &MarketContext<D>) -> Result<Self, RevalError>
    where
        S: SwapInstrument,
        D: DeltaSolver<S>,
    {
        let anchor = market.valuation_date();
        let rows = swap.cashflows(leg, &market.curve)?;
        let live: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.payment_date > anchor)
            .map(|(i, _)| i)
            .collect();

        let df_targets: Vec<(String, DeltaTarget<'_, S>)> = live
            .iter()
            .map(|&i| (row_key(leg, i), DeltaTarget::DiscountFactor(rows[i].payment_date)))
            .collect();
        let df_matrix = market.builder.build(&market.solver, df_targets)?;

        let rate_matrix = match leg {
            Leg::Fixed => None,
            Leg::Float => {
                let rate_targets: Vec<(String, DeltaTarget<'_, S>)> = live
                    .iter()
                    .map(|&i| {
                        (
                            row_key(leg, i),
                            DeltaTarget::CashflowRate { swap, leg, row: i },
                        )
                    })
                    .collect();
                Some(market.builder.build(&market.solver, rate_targets)?)
            }
        };

        Ok(Self {
            rows,
            df_matrix,
            rate_matrix,
        })
    }

    fn reprice(
        &self,
        leg: Leg,
        anchor: Date,
        change: &ChangeVector,
    ) -> Result<Vec<CashflowRow>, RevalError> {
        let dfs = reprice(
            &Valuation::Table(self.table(leg, |r| r.discount_factor)),
            Some(&self.df_matrix),
            change,
        )?
        .values();
        let rates = reprice(
            &Valuation::Table(self.table(leg, |r| r.rate)),
            self.rate_matrix.as_ref(),
            change,
        )?
        .values();

        let mut rows = self.rows.clone();
        for (i, row) in rows.iter_mut().enumerate() {
            if row.payment_date > anchor {
                row.reprice(dfs[i], rates[i]);
            }
        }
        Ok(rows)
    }

    fn table(&self, leg: Leg, field: impl Fn(&CashflowRow) -> f64) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| (row_key(leg, i), field(r)))
            .collect()
    }
}

fn row_key(leg: Leg, index: usize) -> String {
    format!("{}:{}", leg, index)
}

struct SwapBaseline<S> {
    swap: S,
    npv: f64,
    par_rate: f64,
    fixed_rate_risk: f64,
    npv_matrix: SensitivityMatrix,
    fixed: LegBaseline,
    float: LegBaseline,
}

impl<S: SwapInstrument> SwapBaseline<S> {
    fn build<D: DeltaSolver<S>>(swap: S, market: &MarketContext<D>) -> Result<Self, RevalError> {
        let curve = &market.curve;
        let npv = swap.npv(curve)?;
        let par_rate = swap.par_rate(curve)?;
        let fixed_rate_risk = swap.fixed_rate_risk(curve)?;

        let npv_targets: Vec<(String, DeltaTarget<'_, S>)> =
            vec![(NPV_KEY.to_string(), DeltaTarget::Npv(&swap))];
        let npv_matrix = market.builder.build(&market.solver, npv_targets)?;
        let fixed = LegBaseline::build(&swap, Leg::Fixed, market)?;
        let float = LegBaseline::build(&swap, Leg::Float, market)?;

        Ok(Self {
            swap,
            npv,
            par_rate,
            fixed_rate_risk,
            npv_matrix,
            fixed,
            float,
        })
    }

    fn leg(&self, leg: Leg) -> &LegBaseline {
        match leg {
            Leg::Fixed => &self.fixed,
            Leg::Float => &self.float,
        }
    }

    fn revalue(
        &self,
        definition: &SwapDefinition,
        change: ChangeVector,
    ) -> Result<Revaluation, RevalError> {
        let valuation = reprice_swap(
            self.npv,
            definition.fixed_rate,
            self.fixed_rate_risk,
            Some(&self.npv_matrix),
            &change,
        )?;
        Ok(Revaluation {
            npv: valuation.npv,
            par_rate: valuation.par_rate,
            npv_change: valuation.npv - self.npv,
            change,
        })
    }
}

enum Stage<S, D> {
    Uninitialized,
    ContextSet(MarketContext<D>),
    Hydrated(MarketContext<D>, SwapBaseline<S>),
    Revalued(MarketContext<D>, SwapBaseline<S>, Revaluation),
}

impl<S, D> Default for Stage<S, D> {
    fn default() -> Self {
        Stage::Uninitialized
    }
}

impl<S, D> Stage<S, D> {
    fn state(&self) -> ContextState {
        match self {
            Stage::Uninitialized => ContextState::Uninitialized,
            Stage::ContextSet(..) => ContextState::ContextSet,
            Stage::Hydrated(..) => ContextState::Hydrated,
            Stage::Revalued(..) => ContextState::Revalued,
        }
    }

    fn market(&self) -> Option<&MarketContext<D>> {
        match self {
            Stage::Uninitialized => None,
            Stage::ContextSet(m) | Stage::Hydrated(m, _) | Stage::Revalued(m, _, _) => Some(m),
        }
    }

    fn baseline(&self) -> Option<&SwapBaseline<S>> {
        match self {
            Stage::Hydrated(_, b) | Stage::Revalued(_, b, _) => Some(b),
            _ => None,
        }
    }

    fn revaluation(&self) -> Option<&Revaluation> {
        match self {
            Stage::Revalued(_, _, r) => Some(r),
            _ => None,
        }
    }

    fn into_market(self) -> Option<MarketContext<D>> {
        match self {
            Stage::Uninitialized => None,
            Stage::ContextSet(m) | Stage::Hydrated(m, _) | Stage::Revalued(m, _, _) => Some(m),
        }
    }

    fn into_hydrated(self) -> Option<(MarketContext<D>, SwapBaseline<S>)> {
        match self {
            Stage::Hydrated(m, b) | Stage::Revalued(m, b, _) => Some((m, b)),
            _ => None,
        }
    }
}

/// Revaluation session for one swap.
///
/// # Example
///
/// ```
/// use rates_core::market_data::TermStructure;
/// use rates_core::traits::CurveCalibrator;
/// use rates_core::types::{Date, FixingSeries, SwapDefinition};
/// use rates_session::demo::{DemoBackend, FlatForwardCalibrator};
/// use rates_session::{ContextState, SwapContext};
///
/// let today = Date::from_ymd(2025, 1, 2).unwrap();
/// let quotes = TermStructure::from_labels(&[("1Y", 0.043), ("2Y", 0.041), ("5Y", 0.039)]).unwrap();
/// let curve = FlatForwardCalibrator.calibrate(today, &quotes.tenors(), &quotes).unwrap();
/// let swap = SwapDefinition::new(
///     "IRS-1",
///     today,
///     Date::from_ymd(2029, 1, 2).unwrap(),
///     10_000_000.0,
///     0.04,
/// );
///
/// let mut ctx = SwapContext::new(DemoBackend::new());
/// ctx.set_context(swap, curve, quotes.clone()).unwrap();
/// ctx.set_fixings(FixingSeries::default()).unwrap();
///
/// let mut moved = quotes.clone();
/// moved.set_rate_at(2, 0.0395);
/// let out = ctx.revalue(Some(&moved)).unwrap();
/// assert!(out.npv_change > 0.0);
/// assert_eq!(ctx.state(), ContextState::Revalued);
/// ```
pub struct SwapContext<B: PricingBackend> {
    backend: B,
    fixings: FixingSeries,
    stage: Stage<B::Swap, B::Solver>,
}

impl<B: PricingBackend> SwapContext<B> {
    /// Creates an uninitialised session.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fixings: FixingSeries::default(),
            stage: Stage::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.stage.state()
    }

    /// Pricing backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Selected swap.
    pub fn definition(&self) -> Option<&SwapDefinition> {
        self.stage.market().map(|m| &m.definition)
    }

    /// Baseline curve.
    pub fn curve(&self) -> Option<&NodeCurve> {
        self.stage.market().map(|m| &m.curve)
    }

    /// Baseline calibration quotes.
    pub fn calibration(&self) -> Option<&TermStructure> {
        self.stage.market().map(|m| &m.calibration)
    }

    /// Curve-node delta matrix (rows keyed `df:<node date>`).
    pub fn curve_matrix(&self) -> Option<&SensitivityMatrix> {
        self.stage.market().map(|m| &m.curve_matrix)
    }

    /// NPV delta matrix (single row keyed [`NPV_KEY`]).
    pub fn npv_matrix(&self) -> Option<&SensitivityMatrix> {
        self.stage.baseline().map(|b| &b.npv_matrix)
    }

    /// Historical fixings applied to the instrument.
    pub fn fixings(&self) -> &FixingSeries {
        &self.fixings
    }

    /// Built instrument.
    pub fn swap(&self) -> Option<&B::Swap> {
        self.stage.baseline().map(|b| &b.swap)
    }

    /// Exact NPV on the baseline curve.
    pub fn baseline_npv(&self) -> Option<f64> {
        self.stage.baseline().map(|b| b.npv)
    }

    /// Exact par rate on the baseline curve.
    pub fn baseline_par_rate(&self) -> Option<f64> {
        self.stage.baseline().map(|b| b.par_rate)
    }

    /// Latest revaluation.
    pub fn last_revaluation(&self) -> Option<&Revaluation> {
        self.stage.revaluation()
    }

    /// Selects a swap and its market.
    ///
    /// Builds the solver and the curve-node delta matrix, clears any
    /// fixings and enters `CONTEXT_SET`. Allowed from any state.
    ///
    /// # Errors
    ///
    /// `EmptyCalibration` for an empty quote set; solver failures.
    pub fn set_context(
        &mut self,
        definition: SwapDefinition,
        curve: NodeCurve,
        calibration: TermStructure,
    ) -> Result<(), SessionError> {
        let market = self.build_market(definition, curve, calibration)?;
        self.fixings = FixingSeries::default();
        self.transition(Stage::ContextSet(market));
        Ok(())
    }

    /// Replaces curve and calibration set.
    ///
    /// Matrices are rebuilt. A hydrated session rebuilds its instrument
    /// and baselines with the current fixings and re-enters `REVALUED` with
    /// a zero change.
    pub fn update_calibration(
        &mut self,
        curve: NodeCurve,
        calibration: TermStructure,
    ) -> Result<(), SessionError> {
        let definition = self.require_market("update_calibration")?.definition.clone();
        let market = self.build_market(definition, curve, calibration)?;

        let next = if self.stage.baseline().is_some() {
            let fixings = self.fixings.before(market.valuation_date());
            let baseline = self.build_baseline(&market, &fixings)?;
            let revaluation =
                baseline.revalue(&market.definition, ChangeVector::zeros(market.calibration.labels()))?;
            self.fixings = fixings;
            Stage::Revalued(market, baseline, revaluation)
        } else {
            Stage::ContextSet(market)
        };
        self.transition(next);
        Ok(())
    }

    /// Replaces the curve for the same calibration instruments.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `calibration` does not have the current
    /// tenors in the current order; the session is left unchanged.
    pub fn update_curve(
        &mut self,
        curve: NodeCurve,
        calibration: TermStructure,
    ) -> Result<(), SessionError> {
        let current = self.require_market("update_curve")?.calibration.labels();
        let incoming = calibration.labels();
        if current != incoming {
            return Err(RevalError::dimension("calibration tenors", current.len(), incoming.len()).into());
        }
        self.update_calibration(curve, calibration)
    }

    /// Applies historical fixings and builds the instrument baselines.
    ///
    /// Observations on or after the valuation date are dropped. Enters
    /// `HYDRATED`.
    pub fn set_fixings(&mut self, series: FixingSeries) -> Result<(), SessionError> {
        let market = self.require_market("set_fixings")?;
        let fixings = series.before(market.valuation_date());
        let dropped = series.len() - fixings.len();
        let baseline = self.build_baseline(market, &fixings)?;

        if dropped > 0 {
            debug!(dropped, "Ignored fixings on or after the valuation date");
        }
        self.fixings = fixings;
        if let Some(market) = std::mem::take(&mut self.stage).into_market() {
            self.transition(Stage::Hydrated(market, baseline));
        }
        Ok(())
    }

    /// Hydrates with the fixings already held by the session.
    pub fn hydrate(&mut self) -> Result<(), SessionError> {
        self.set_fixings(self.fixings.clone())
    }

    /// Approximates NPV and par rate after a market move.
    ///
    /// `market` is compared with the baseline calibration quotes. `None`
    /// repeats the latest move (a zero move if there is none yet).
    pub fn revalue(&mut self, market: Option<&TermStructure>) -> Result<Revaluation, SessionError> {
        let (ctx, baseline) = self.require_baseline("revalue")?;
        let change = match (market, self.stage.revaluation()) {
            (Some(m), _) => ctx.change_to(m),
            (None, Some(last)) => last.change.clone(),
            (None, None) => ChangeVector::zeros(ctx.calibration.labels()),
        };
        let revaluation = baseline.revalue(&ctx.definition, change)?;

        debug!(
            npv = revaluation.npv,
            par_rate = revaluation.par_rate,
            npv_change = revaluation.npv_change,
            "Revalued swap"
        );
        if let Some((market, baseline)) = std::mem::take(&mut self.stage).into_hydrated() {
            self.transition(Stage::Revalued(market, baseline, revaluation.clone()));
        }
        Ok(revaluation)
    }

    /// NPV, par rate and per-tenor risk of the hydrated swap.
    pub fn get_risk(&self) -> Result<SwapRisk, SessionError> {
        let (_, baseline) = self.require_baseline("get_risk")?;
        let (npv, par_rate) = match self.stage.revaluation() {
            Some(r) => (r.npv, r.par_rate),
            None => (baseline.npv, baseline.par_rate),
        };

        let matrix = &baseline.npv_matrix;
        let bp = matrix.unit().basis_point();
        let row = matrix.row_by_key(NPV_KEY).unwrap_or(&[]);
        let per_bp: Vec<f64> = row.iter().map(|d| d * bp).collect();
        let series = RiskSeries::from_fields(
            matrix
                .columns()
                .iter()
                .map(String::as_str)
                .zip(per_bp.iter().copied()),
        );

        Ok(SwapRisk {
            npv,
            par_rate,
            fixed_rate_risk: baseline.fixed_rate_risk,
            series,
        })
    }

    /// Curve with node discount factors moved by `curve_matrix · Δ`.
    pub fn get_shocked_curve(&self, market: &TermStructure) -> Result<NodeCurve, SessionError> {
        let ctx = self.require_market("get_shocked_curve")?;
        Ok(shocked_curve(ctx, market)?)
    }

    /// Fixed-leg cashflows after a market move.
    pub fn get_fixed_flows(&self, market: &TermStructure) -> Result<Vec<CashflowRow>, SessionError> {
        self.leg_flows("get_fixed_flows", Leg::Fixed, market)
    }

    /// Floating-leg cashflows after a market move.
    pub fn get_float_flows(&self, market: &TermStructure) -> Result<Vec<CashflowRow>, SessionError> {
        self.leg_flows("get_float_flows", Leg::Float, market)
    }

    /// Base cashflows of one leg.
    pub fn base_flows(&self, leg: Leg) -> Result<&[CashflowRow], SessionError> {
        let (_, baseline) = self.require_baseline("base_flows")?;
        Ok(&baseline.leg(leg).rows)
    }

    /// Fixing table of one floating period on the baseline curve.
    pub fn get_fixings_table(&self, period: usize) -> Result<Vec<FixingRow>, SessionError> {
        let (ctx, baseline) = self.require_baseline("get_fixings_table")?;
        Ok(baseline.swap.fixings_table(period, &ctx.curve)?)
    }

    /// Fixing table of one floating period on the shocked curve.
    ///
    /// Only unfixed observations take the shocked rate, hedging notional
    /// and risk; historical observations keep their baseline values.
    pub fn get_updated_fixings_table(
        &self,
        period: usize,
        market: &TermStructure,
    ) -> Result<Vec<FixingRow>, SessionError> {
        let (ctx, baseline) = self.require_baseline("get_updated_fixings_table")?;
        let anchor = ctx.valuation_date();
        let mut rows = baseline.swap.fixings_table(period, &ctx.curve)?;
        let shocked = shocked_curve(ctx, market)?;
        let projected = baseline.swap.fixings_table(period, &shocked)?;

        let mut overlaid = 0usize;
        for row in rows.iter_mut().filter(|r| r.is_unfixed(anchor)) {
            if let Some(p) = projected
                .iter()
                .find(|p| p.observation_date == row.observation_date)
            {
                row.rate = p.rate;
                row.hedging_notional = p.hedging_notional;
                row.risk = p.risk;
                overlaid += 1;
            }
        }
        debug!(period, overlaid, total = rows.len(), "Updated fixings table");
        Ok(rows)
    }

    /// Recalibrates from `quotes` and applies the result with
    /// [`update_calibration`](Self::update_calibration).
    pub fn recalibrate<C: CurveCalibrator>(
        &mut self,
        calibrator: &C,
        quotes: &TermStructure,
    ) -> Result<(), SessionError> {
        let valuation_date = self.require_market("recalibrate")?.valuation_date();
        let curve = calibrator.calibrate(valuation_date, &quotes.tenors(), quotes)?;
        self.update_calibration(curve, quotes.clone())
    }

    /// Drops everything and returns to `UNINITIALIZED`.
    pub fn clear(&mut self) {
        self.fixings = FixingSeries::default();
        self.transition(Stage::Uninitialized);
    }

    fn leg_flows(
        &self,
        operation: &'static str,
        leg: Leg,
        market: &TermStructure,
    ) -> Result<Vec<CashflowRow>, SessionError> {
        let (ctx, baseline) = self.require_baseline(operation)?;
        let change = ctx.change_to(market);
        Ok(baseline.leg(leg).reprice(leg, ctx.valuation_date(), &change)?)
    }

    fn build_market(
        &self,
        definition: SwapDefinition,
        curve: NodeCurve,
        calibration: TermStructure,
    ) -> Result<MarketContext<B::Solver>, RevalError> {
        let builder = SensitivityMatrixBuilder::new(&calibration)?;
        let solver = self.backend.solver(&curve, &calibration)?;
        let targets: Vec<(String, DeltaTarget<'_, B::Swap>)> = curve
            .node_dates()
            .into_iter()
            .map(|date| {
                let target = DeltaTarget::DiscountFactor(date);
                (target.describe(), target)
            })
            .collect();
        let curve_matrix = builder.build(&solver, targets)?;

        Ok(MarketContext {
            definition,
            curve,
            calibration,
            solver,
            builder,
            curve_matrix,
        })
    }

    fn build_baseline(
        &self,
        market: &MarketContext<B::Solver>,
        fixings: &FixingSeries,
    ) -> Result<SwapBaseline<B::Swap>, RevalError> {
        let swap = self
            .backend
            .build_swap(&market.definition, &market.curve, fixings)?;
        SwapBaseline::build(swap, market)
    }

    fn require_market(
        &self,
        operation: &'static str,
    ) -> Result<&MarketContext<B::Solver>, SessionError> {
        self.stage.market().ok_or(SessionError::InvalidState {
            operation,
            required: ContextState::ContextSet,
            current: self.state(),
        })
    }

    fn require_baseline(
        &self,
        operation: &'static str,
    ) -> Result<(&MarketContext<B::Solver>, &SwapBaseline<B::Swap>), SessionError> {
        match (self.stage.market(), self.stage.baseline()) {
            (Some(m), Some(b)) => Ok((m, b)),
            _ => Err(SessionError::InvalidState {
                operation,
                required: ContextState::Hydrated,
                current: self.state(),
            }),
        }
    }

    fn transition(&mut self, next: Stage<B::Swap, B::Solver>) {
        let from = self.state();
        let to = next.state();
        self.stage = next;
        let swap = self.definition().map(|d| d.id.as_str()).unwrap_or("-");
        if from != to {
            info!(swap, %from, %to, "Session state changed");
        } else {
            debug!(swap, state = %to, "Session state refreshed");
        }
    }
}

fn shocked_curve<D>(ctx: &MarketContext<D>, market: &TermStructure) -> Result<NodeCurve, RevalError> {
    let change = ctx.change_to(market);
    let base = Valuation::Vector(ctx.curve.node_discount_factors());
    let dfs = reprice(&base, Some(&ctx.curve_matrix), &change)?.values();
    Ok(ctx.curve.with_node_discount_factors(&dfs)?)
}

impl<B: PricingBackend> fmt::Debug for SwapContext<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapContext")
            .field("state", &self.state())
            .field("swap", &self.definition().map(|d| d.id.as_str()))
            .field("valuation_date", &self.stage.market().map(|m| m.valuation_date()))
            .field("fixings", &self.fixings.len())
            .finish()
    }
}
