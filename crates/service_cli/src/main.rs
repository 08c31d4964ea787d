//! rates-desk - Command Line Operations for Incremental Swap Revaluation
//!
//! This is the operational entry point for the rates revaluation crates.
//!
//! # Commands
//!
//! - `rates-desk simulate` - Tick the seed curve and print every move
//! - `rates-desk approx --blotter <file>` - Reprice a swap blotter after a simulated move
//! - `rates-desk buckets --cashflows <file>` - Bucket counterparty cashflows
//! - `rates-desk revalue` - Run a demo swap session against simulated ticks
//! - `rates-desk curve` - Calibrated discount factors, zero rates and forwards
//! - `rates-desk check` - Validate configuration and input files
//!
//! # Architecture
//!
//! As the service layer, this crate wires the simulator (`rates_market`),
//! the revaluation engine (`rates_risk`) and the swap session
//! (`rates_session`) behind one command-line interface.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rates_core::types::{Date, Tenor};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;

pub use error::{CliError, Result};

use commands::OutputFormat;
use config::DeskConfig;

/// Incremental swap revaluation desk
#[derive(Parser)]
#[command(name = "rates-desk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "rates-desk.toml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick the seed curve and print every move
    Simulate {
        /// Number of ticks (defaults to the configured count)
        #[arg(short, long)]
        ticks: Option<usize>,

        /// Only move this tenor (e.g. 5Y)
        #[arg(long)]
        target: Option<Tenor>,
    },

    /// Reprice a swap blotter after a simulated market move
    Approx {
        /// Blotter JSON file (defaults to the configured blotter)
        #[arg(short, long)]
        blotter: Option<PathBuf>,

        /// Number of ticks
        #[arg(short, long)]
        ticks: Option<usize>,
    },

    /// Bucket counterparty cashflows and reprice them after a move
    Buckets {
        /// Cashflow JSON file
        #[arg(long)]
        cashflows: PathBuf,

        /// Number of ticks; 0 prints the unshocked buckets
        #[arg(short, long, default_value = "0")]
        ticks: usize,
    },

    /// Run a demo swap session against simulated ticks
    Revalue {
        /// Valuation and start date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<Date>,

        /// Swap maturity
        #[arg(short, long, default_value = "5Y")]
        maturity: Tenor,

        /// Signed notional, positive pays fixed
        #[arg(short, long, default_value = "10000000", allow_hyphen_values = true)]
        notional: f64,

        /// Fixed rate in decimals (defaults to the par rate)
        #[arg(long)]
        fixed_rate: Option<f64>,

        /// Number of ticks
        #[arg(short, long)]
        ticks: Option<usize>,
    },

    /// Calibrated discount factors, zero rates and overnight forwards
    Curve {
        /// Valuation date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<Date>,

        /// Simulated ticks to show next to the seed curve
        #[arg(short, long, default_value = "0")]
        ticks: usize,
    },

    /// Validate configuration and input files
    Check {
        /// Blotter JSON file
        #[arg(long)]
        blotter: Option<PathBuf>,

        /// Cashflow JSON file
        #[arg(long)]
        cashflows: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DeskConfig::load_with_env_and_validate(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "Configuration loaded");

    let format = cli.format;
    match cli.command {
        Commands::Simulate { ticks, target } => {
            commands::simulate::run(&config, ticks.unwrap_or(config.ticks), target, format)?
        }
        Commands::Approx { blotter, ticks } => {
            let blotter = blotter
                .or_else(|| config.blotter.clone())
                .ok_or_else(|| CliError::InvalidArgument("no blotter file given".to_string()))?;
            commands::approx::run(&config, &blotter, ticks.unwrap_or(config.ticks), format)?
        }
        Commands::Buckets { cashflows, ticks } => {
            commands::buckets::run(&config, &cashflows, ticks, format)?
        }
        Commands::Revalue {
            date,
            maturity,
            notional,
            fixed_rate,
            ticks,
        } => {
            let args = commands::revalue::RevalueArgs {
                today: date,
                maturity,
                notional,
                fixed_rate,
                ticks: ticks.unwrap_or(config.ticks),
            };
            commands::revalue::run(&config, &args, format)?
        }
        Commands::Curve { date, ticks } => commands::curve::run(&config, date, ticks, format)?,
        Commands::Check { blotter, cashflows } => {
            commands::check::run(&config, blotter.as_deref(), cashflows.as_deref())?
        }
    }
    Ok(())
}
