mod session;

pub use session::*;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::DispenserLedger;
use crate::config::{config_path_from_env, AppConfig};
use crate::domain::{format_litres, PriceOrigin};

/// Fuel station - dispenser ledger with live prices and receipts
#[derive(Parser)]
#[command(name = "fuelstation")]
#[command(about = "Run a fuel station: sell fuel, refill dispensers, keep receipts")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to $FUELSTATION_CONFIG, then built-in defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive station session
    Run,

    /// Fetch the current fuel prices and print them
    Prices,

    /// Show the configured dispensers and their levels
    Levels,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        init_logging(&config.logging.level, self.verbose);

        match self.command {
            Commands::Run => {
                let mut ledger = build_ledger(&config).await?;
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                run_session(&mut ledger, stdin.lock(), stdout.lock()).await?;
            }

            Commands::Prices => {
                let ledger = build_ledger(&config).await?;
                let mut out = std::io::stdout().lock();
                write_prices(&mut out, &ledger)?;
            }

            Commands::Levels => {
                let ledger = DispenserLedger::new(
                    config.ledger_settings(),
                    config.price_source()?,
                    config.receipt_sink(),
                )?;
                let mut out = std::io::stdout().lock();
                write_levels(&mut out, &ledger)?;
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<AppConfig> {
        match self.config.clone().or_else(config_path_from_env) {
            Some(path) => AppConfig::load(&path),
            None => Ok(AppConfig::default()),
        }
    }
}

/// Build the ledger described by `config` and take the first price snapshot.
pub async fn build_ledger(config: &AppConfig) -> Result<DispenserLedger> {
    let ledger = DispenserLedger::start(
        config.ledger_settings(),
        config.price_source()?,
        config.receipt_sink(),
    )
    .await
    .context("Failed to start the station")?;
    Ok(ledger)
}

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// configured level; `--verbose` wins over both.
fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn write_prices<W: Write>(out: &mut W, ledger: &DispenserLedger) -> Result<()> {
    if let PriceOrigin::Fallback(reason) = ledger.price_origin() {
        writeln!(out, "Failed to get fuel prices: {}", reason)?;
        writeln!(out, "Using latest updated price 2017:")?;
    }
    writeln!(out, "{}", ledger.prices())?;
    Ok(())
}

pub fn write_levels<W: Write>(out: &mut W, ledger: &DispenserLedger) -> Result<()> {
    for (name, level) in ledger.levels() {
        writeln!(
            out,
            "Petrol level at {}: {} litres",
            name,
            format_litres(level)
        )?;
    }
    Ok(())
}
