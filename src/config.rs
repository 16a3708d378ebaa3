//! Station configuration, read from a TOML file.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) describes the standard three-dispenser station on the live feed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::{LedgerSettings, RetryConfig};
use crate::domain::{Amount, PriceTable, DEFAULT_CAPACITY};
use crate::pricing::{FixedPriceSource, HttpPriceSource, PriceSource, DEFAULT_FEED_URL};
use crate::storage::{FileReceiptSink, DEFAULT_RECEIPT_DIR, DEFAULT_RECEIPT_PREFIX};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "FUELSTATION_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub station: StationConfig,
    pub prices: PriceFeedConfig,
    pub receipts: ReceiptConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    pub dispensers: Vec<String>,
    pub capacity: Amount,
    pub min_level: Amount,
    pub fetch_timeout_ms: u64,
    pub receipt_timeout_ms: u64,
    pub receipt_retry: RetryConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            dispensers: vec![
                "Dispenser 1".to_string(),
                "Dispenser 2".to_string(),
                "Dispenser 3".to_string(),
            ],
            capacity: DEFAULT_CAPACITY,
            min_level: Decimal::from(20),
            fetch_timeout_ms: 5000,
            receipt_timeout_ms: 5000,
            receipt_retry: RetryConfig::default(),
        }
    }
}

/// Where prices come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum PriceFeedConfig {
    /// JSON feed over HTTP.
    Live {
        #[serde(default = "default_feed_url")]
        url: String,
    },
    /// Static price list, no network access.
    Fixed {
        ron95: Amount,
        ron97: Amount,
        diesel: Amount,
    },
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        PriceFeedConfig::Live {
            url: default_feed_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiptConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_RECEIPT_DIR),
            prefix: DEFAULT_RECEIPT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "fuelstation=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML")
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            dispensers: self.station.dispensers.clone(),
            capacity: self.station.capacity,
            min_level: self.station.min_level,
            fetch_timeout: Duration::from_millis(self.station.fetch_timeout_ms),
            receipt_timeout: Duration::from_millis(self.station.receipt_timeout_ms),
            receipt_retry: self.station.receipt_retry.clone(),
        }
    }

    /// Build the configured price source.
    pub fn price_source(&self) -> Result<Box<dyn PriceSource>> {
        match &self.prices {
            PriceFeedConfig::Live { url } => {
                let timeout = Duration::from_millis(self.station.fetch_timeout_ms);
                let source = HttpPriceSource::new(url.clone(), timeout)
                    .context("Failed to set up the price feed client")?;
                Ok(Box::new(source))
            }
            PriceFeedConfig::Fixed {
                ron95,
                ron97,
                diesel,
            } => Ok(Box::new(FixedPriceSource::new(PriceTable::new(
                *ron95, *ron97, *diesel,
            )))),
        }
    }

    pub fn receipt_sink(&self) -> FileReceiptSink {
        FileReceiptSink::new(self.receipts.directory.clone(), self.receipts.prefix.clone())
    }
}

/// Configuration file named by `FUELSTATION_CONFIG`, if set.
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV).map(PathBuf::from)
}
