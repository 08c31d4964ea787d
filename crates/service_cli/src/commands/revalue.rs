//! Revalue command implementation
//!
//! Runs a demo swap session on the configured seed curve, feeds it every
//! simulated tick and compares the final first-order approximation with a
//! full recalibration.

use rates_core::traits::{CurveCalibrator, SwapInstrument};
use rates_core::types::{Date, FixingSeries, SwapDefinition, Tenor};
use rates_session::demo::{DemoBackend, FlatForwardCalibrator};
use rates_session::SwapContext;
use serde::Serialize;
use tracing::info;

use super::{print_json, simulator, OutputFormat};
use crate::config::DeskConfig;
use crate::{CliError, Result};

/// Swap traded by the `revalue` command.
#[derive(Debug, Clone)]
pub struct RevalueArgs {
    /// Valuation and start date; the current date when absent
    pub today: Option<Date>,
    /// Swap maturity from `today`
    pub maturity: Tenor,
    /// Signed notional (positive pays fixed)
    pub notional: f64,
    /// Fixed rate in decimals; the baseline par rate when absent
    pub fixed_rate: Option<f64>,
    /// Number of ticks
    pub ticks: usize,
}

#[derive(Debug, Serialize)]
struct StepRow {
    step: usize,
    tenor: String,
    npv: f64,
    par_rate: f64,
    npv_change: f64,
}

#[derive(Debug, Serialize)]
struct Summary {
    baseline_npv: f64,
    baseline_par_rate: f64,
    dv01: f64,
    approx_npv: f64,
    exact_npv: f64,
    approx_par_rate: f64,
    exact_par_rate: f64,
}

#[derive(Serialize)]
struct RevalueOutput {
    steps: Vec<StepRow>,
    summary: Summary,
}

/// Run the revalue command
pub fn run(config: &DeskConfig, args: &RevalueArgs, format: OutputFormat) -> Result<()> {
    if !args.notional.is_finite() || args.notional == 0.0 {
        return Err(CliError::InvalidArgument(format!(
            "notional must be finite and non-zero, got {}",
            args.notional
        )));
    }

    let seed = config.seed_term_structure()?;
    let tenors = seed.tenors();
    let today = args.today.unwrap_or_else(Date::today);
    let termination = today.add_tenor(args.maturity)?;
    let curve = FlatForwardCalibrator.calibrate(today, &tenors, &seed)?;

    let mut ctx = SwapContext::new(DemoBackend::default());
    let definition = SwapDefinition::new(
        "DESK-1",
        today,
        termination,
        args.notional,
        args.fixed_rate.unwrap_or(0.0),
    );
    ctx.set_context(definition.clone(), curve.clone(), seed.clone())?;
    ctx.set_fixings(FixingSeries::default())?;

    if args.fixed_rate.is_none() {
        let par = ctx.baseline_par_rate().unwrap_or(0.0);
        info!(par_rate = par, "Trading at the baseline par rate");
        ctx.set_context(SwapDefinition { fixed_rate: par, ..definition }, curve, seed.clone())?;
        ctx.hydrate()?;
    }

    let risk = ctx.get_risk()?;
    info!(
        npv = risk.npv,
        par_rate = risk.par_rate,
        dv01 = risk.series.dv01,
        "Swap hydrated"
    );

    let mut sim = simulator(config)?;
    let mut steps = Vec::with_capacity(args.ticks);
    for step in 1..=args.ticks {
        let tick = sim.tick()?;
        let reval = ctx.revalue(Some(sim.curve()))?;
        steps.push(StepRow {
            step,
            tenor: tick.tenor.to_string(),
            npv: reval.npv,
            par_rate: reval.par_rate,
            npv_change: reval.npv_change,
        });
    }

    let approx = ctx.revalue(None)?;
    let shocked = FlatForwardCalibrator.calibrate(today, &tenors, sim.curve())?;
    let (exact_npv, exact_par_rate) = match ctx.swap() {
        Some(swap) => (swap.npv(&shocked)?, swap.par_rate(&shocked)?),
        None => (approx.npv, approx.par_rate),
    };

    let summary = Summary {
        baseline_npv: risk.npv,
        baseline_par_rate: risk.par_rate,
        dv01: risk.series.dv01,
        approx_npv: approx.npv,
        exact_npv,
        approx_par_rate: approx.par_rate,
        exact_par_rate,
    };

    match format {
        OutputFormat::Json => print_json(&RevalueOutput { steps, summary })?,
        OutputFormat::Table => {
            println!(
                "{:>5}  {:>5}  {:>16}  {:>10}  {:>14}",
                "step", "tenor", "NPV", "par", "ΔNPV"
            );
            for row in &steps {
                println!(
                    "{:>5}  {:>5}  {:>16.2}  {:>10.6}  {:>14.2}",
                    row.step, row.tenor, row.npv, row.par_rate, row.npv_change
                );
            }
            println!();
            println!("baseline NPV     {:>16.2}   par {:.6}", summary.baseline_npv, summary.baseline_par_rate);
            println!("DV01 (per bp)    {:>16.2}", summary.dv01);
            println!("approx NPV       {:>16.2}   par {:.6}", summary.approx_npv, summary.approx_par_rate);
            println!("recalibrated NPV {:>16.2}   par {:.6}", summary.exact_npv, summary.exact_par_rate);
            println!(
                "approximation error {:>13.2}",
                summary.approx_npv - summary.exact_npv
            );
        }
    }
    Ok(())
}
