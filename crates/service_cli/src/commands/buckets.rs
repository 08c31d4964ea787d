//! Buckets command implementation
//!
//! Groups counterparty cashflows into day/week/month/year buckets and, with
//! a market move, reprices the bucket cashflows through their risk.

use std::path::Path;

use rates_risk::buckets::{bucket_risk_matrix, bucket_table, CashflowBucket};
use rates_risk::{reprice, ChangeVector};
use serde::Serialize;
use tracing::info;

use super::{print_json, simulate_move, OutputFormat};
use crate::config::DeskConfig;
use crate::input::CashflowFile;
use crate::Result;

#[derive(Serialize)]
struct BucketRow<'a> {
    #[serde(flatten)]
    bucket: &'a CashflowBucket,
    shocked_cashflow: f64,
}

/// Run the buckets command
pub fn run(
    config: &DeskConfig,
    cashflows: &Path,
    ticks: usize,
    format: OutputFormat,
) -> Result<()> {
    let file = CashflowFile::load(cashflows)?;
    let buckets = file.buckets()?;
    info!(
        today = %file.anchor(),
        buckets = buckets.len(),
        "Bucketed counterparty cashflows"
    );

    let shocked = if ticks > 0 {
        let market = simulate_move(config, ticks)?;
        let change = ChangeVector::diff(&market.seed, &market.current);
        let matrix = bucket_risk_matrix(&buckets, file.risk_unit)?;
        reprice(&bucket_table(&buckets), Some(&matrix), &change)?.values()
    } else {
        buckets.iter().map(|b| b.cashflow).collect()
    };

    let rows: Vec<BucketRow<'_>> = buckets
        .iter()
        .zip(shocked)
        .map(|(bucket, shocked_cashflow)| BucketRow {
            bucket,
            shocked_cashflow,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!(
                "{:<22}  {:>10}  {:>6}  {:>16}  {:>16}  {:>10}",
                "bucket", "start", "days", "cashflow", "shocked", "weight"
            );
            for row in &rows {
                let b = &row.bucket.bucket;
                println!(
                    "{:<22}  {:>10}  {:>6}  {:>16.2}  {:>16.2}  {:>10.4}",
                    b.label, b.start, b.start_days, row.bucket.cashflow, row.shocked_cashflow, row.bucket.weight
                );
            }
        }
    }
    Ok(())
}
