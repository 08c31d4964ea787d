//! Curve command implementation
//!
//! Calibrates the seed curve and prints discount factors, zero rates and
//! the overnight forward strip, optionally next to a simulated move.

use rates_core::market_data::curves::{curve_points, forward_strip, CurvePoint, ForwardPoint};
use rates_core::traits::CurveCalibrator;
use rates_core::types::Date;
use rates_session::demo::FlatForwardCalibrator;
use serde::Serialize;

use super::{print_json, simulate_move, OutputFormat};
use crate::config::DeskConfig;
use crate::Result;

#[derive(Serialize)]
struct CurveReport {
    valuation_date: Date,
    points: Vec<CurvePoint>,
    forwards: Vec<ForwardPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shocked: Option<Vec<CurvePoint>>,
}

/// Run the curve command
pub fn run(config: &DeskConfig, today: Option<Date>, ticks: usize, format: OutputFormat) -> Result<()> {
    let today = today.unwrap_or_else(Date::today);
    let market = simulate_move(config, ticks)?;
    let tenors = market.seed.tenors();

    let curve = FlatForwardCalibrator.calibrate(today, &tenors, &market.seed)?;
    let points = curve_points(&curve, &tenors)?;
    let forwards = forward_strip(&curve, &tenors)?;

    let shocked = if ticks > 0 {
        let moved = FlatForwardCalibrator.calibrate(today, &tenors, &market.current)?;
        Some(curve_points(&moved, &tenors)?)
    } else {
        None
    };

    let report = CurveReport {
        valuation_date: today,
        points,
        forwards,
        shocked,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!("valuation date {}", report.valuation_date);
            println!(
                "{:>5}  {:>10}  {:>12}  {:>10}  {:>10}  {:>12}",
                "term", "maturity", "df", "zero", "fwd", "zero'"
            );
            // forwards[0] is the overnight point
            for (i, p) in report.points.iter().enumerate() {
                let fwd = report.forwards.get(i + 1).map_or(f64::NAN, |f| f.forward_rate);
                let moved = report
                    .shocked
                    .as_ref()
                    .and_then(|s| s.get(i))
                    .map_or(String::from("-"), |s| format!("{:.6}", s.zero_rate));
                println!(
                    "{:>5}  {:>10}  {:>12.8}  {:>10.6}  {:>10.6}  {:>12}",
                    p.term,
                    p.maturity.to_string(),
                    p.discount_factor,
                    p.zero_rate,
                    fwd,
                    moved
                );
            }
            if let Some(on) = report.forwards.first() {
                println!("overnight forward {:.6}", on.forward_rate);
            }
        }
    }
    Ok(())
}
