use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::domain::{
    format_litres, format_ringgit, quote, Amount, DispenseError, Dispenser, DispenserId,
    DispenserStatus, FuelType, PriceOrigin, PriceTable, QuoteError, ReceiptNumber, Sale,
    DEFAULT_CAPACITY,
};
use crate::pricing::{FetchError, PriceSource};
use crate::storage::{ReceiptSink, WriteError};

use super::{retry_with_backoff, RetryConfig, StationError};

/// Station layout and operating limits.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    /// Dispenser names, in index order.
    pub dispensers: Vec<String>,
    /// Tank capacity of every dispenser, in litres.
    pub capacity: Amount,
    /// Purchases are refused while a dispenser is below this level.
    pub min_level: Amount,
    pub fetch_timeout: Duration,
    pub receipt_timeout: Duration,
    pub receipt_retry: RetryConfig,
}

impl LedgerSettings {
    fn validate(&self) -> Result<(), StationError> {
        if self.dispensers.is_empty() {
            return Err(StationError::Config(
                "a station needs at least one dispenser".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.dispensers {
            if name.trim().is_empty() {
                return Err(StationError::Config(
                    "dispenser names cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(StationError::Config(format!(
                    "duplicate dispenser name: {}",
                    name
                )));
            }
        }

        if self.capacity <= Decimal::ZERO {
            return Err(StationError::Config(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if self.min_level < Decimal::ZERO || self.min_level > self.capacity {
            return Err(StationError::Config(format!(
                "minimum level {} must be between 0 and the capacity {}",
                self.min_level, self.capacity
            )));
        }
        if self.receipt_retry.max_attempts == 0 {
            return Err(StationError::Config(
                "receipt retry needs at least one attempt".to_string(),
            ));
        }
        let multiplier = self.receipt_retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(StationError::Config(format!(
                "receipt retry backoff multiplier must be at least 1.0, got {}",
                multiplier
            )));
        }
        Ok(())
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            dispensers: vec![
                "Dispenser 1".to_string(),
                "Dispenser 2".to_string(),
                "Dispenser 3".to_string(),
            ],
            capacity: DEFAULT_CAPACITY,
            min_level: Decimal::from(20),
            fetch_timeout: Duration::from_secs(5),
            receipt_timeout: Duration::from_secs(5),
            receipt_retry: RetryConfig::default(),
        }
    }
}

/// Result of a price refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRefresh {
    pub table: PriceTable,
    pub origin: PriceOrigin,
}

/// Result of a purchase request that did not fail validation
#[derive(Debug)]
pub enum PurchaseOutcome {
    Completed(CompletedSale),
    /// The dispenser is below the minimum level; nothing was sold.
    LowLevel(LowLevelWarning),
}

/// A debited sale and what happened to its receipt
#[derive(Debug)]
pub struct CompletedSale {
    pub sale: Sale,
    pub remaining_level: Amount,
    /// Where the receipt was stored. An error here means the sale stands but
    /// has no durable record and needs reconciling.
    pub receipt: Result<PathBuf, WriteError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowLevelWarning {
    pub dispenser_id: DispenserId,
    pub dispenser_name: String,
    pub level: Amount,
    pub min_level: Amount,
}

impl std::fmt::Display for LowLevelWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Warning: Low petrol level at {} ({} litres). Please top up more fuel.",
            self.dispenser_name,
            format_litres(self.level)
        )
    }
}

/// The station's dispenser ledger: levels, prices and receipt numbering.
/// This is the only interface front-ends talk to.
pub struct DispenserLedger {
    dispensers: Vec<Dispenser>,
    prices: PriceTable,
    origin: PriceOrigin,
    next_receipt: ReceiptNumber,
    settings: LedgerSettings,
    price_source: Box<dyn PriceSource>,
    receipts: Box<dyn ReceiptSink>,
}

impl DispenserLedger {
    /// Create a ledger with full dispensers. Until the first refresh the
    /// fallback table is in effect.
    pub fn new(
        settings: LedgerSettings,
        price_source: impl PriceSource + 'static,
        receipts: impl ReceiptSink + 'static,
    ) -> Result<Self, StationError> {
        settings.validate()?;

        let dispensers = settings
            .dispensers
            .iter()
            .enumerate()
            .map(|(id, name)| Dispenser::new(id, name.clone(), settings.capacity))
            .collect();

        Ok(Self {
            dispensers,
            prices: PriceTable::fallback(),
            origin: PriceOrigin::Fallback("prices not fetched yet".to_string()),
            next_receipt: 1,
            settings,
            price_source: Box::new(price_source),
            receipts: Box::new(receipts),
        })
    }

    /// Create a ledger and take an initial price snapshot.
    pub async fn start(
        settings: LedgerSettings,
        price_source: impl PriceSource + 'static,
        receipts: impl ReceiptSink + 'static,
    ) -> Result<Self, StationError> {
        let mut ledger = Self::new(settings, price_source, receipts)?;
        ledger.refresh_prices().await;
        Ok(ledger)
    }

    // ========================
    // Read access
    // ========================

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn price_origin(&self) -> &PriceOrigin {
        &self.origin
    }

    pub fn dispensers(&self) -> &[Dispenser] {
        &self.dispensers
    }

    pub fn dispenser(&self, id: DispenserId) -> Result<&Dispenser, StationError> {
        self.dispensers
            .get(id)
            .ok_or(StationError::InvalidDispenser {
                index: id,
                count: self.dispensers.len(),
            })
    }

    pub fn status(&self, id: DispenserId) -> Result<DispenserStatus, StationError> {
        Ok(self.dispenser(id)?.status(self.settings.min_level))
    }

    pub fn min_level(&self) -> Amount {
        self.settings.min_level
    }

    pub fn capacity(&self) -> Amount {
        self.settings.capacity
    }

    /// The number the next successful sale will get.
    pub fn next_receipt_number(&self) -> ReceiptNumber {
        self.next_receipt
    }

    /// Current level of every dispenser, in index order. Call again to
    /// iterate again.
    pub fn levels(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.dispensers
            .iter()
            .map(|dispenser| (dispenser.name.as_str(), dispenser.level()))
    }

    // ========================
    // Prices
    // ========================

    /// Replace the price table from the price source. Any failure, including
    /// a timeout, installs the fallback table instead. The table is always
    /// replaced as a whole.
    pub async fn refresh_prices(&mut self) -> PriceRefresh {
        let fetched = match tokio::time::timeout(
            self.settings.fetch_timeout,
            self.price_source.fetch(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Transport(format!(
                "no response within {} ms",
                self.settings.fetch_timeout.as_millis()
            ))),
        };

        match fetched {
            Ok(table) => {
                self.prices = table;
                self.origin = PriceOrigin::Live;
            }
            Err(err) => {
                warn!(error = %err, "Failed to get fuel prices, using fallback table");
                self.prices = PriceTable::fallback();
                self.origin = PriceOrigin::Fallback(err.to_string());
            }
        }

        info!(
            ron95 = %format_ringgit(self.prices.ron95),
            ron97 = %format_ringgit(self.prices.ron97),
            diesel = %format_ringgit(self.prices.diesel),
            fallback = self.origin.is_fallback(),
            "Fuel prices"
        );

        PriceRefresh {
            table: self.prices,
            origin: self.origin.clone(),
        }
    }

    // ========================
    // Dispenser operations
    // ========================

    /// Sell fuel worth `amount` from a dispenser.
    ///
    /// Checks run in this order, each one terminal: dispenser index, price
    /// refresh, low level, fuel type, amount, price, inventory. When the
    /// dispenser holds fewer litres than the money buys, it is topped up and
    /// the purchase is refused; the customer has to ask again.
    pub async fn purchase(
        &mut self,
        id: DispenserId,
        fuel: &str,
        amount: Amount,
    ) -> Result<PurchaseOutcome, StationError> {
        self.dispenser(id)?;

        self.refresh_prices().await;

        let min_level = self.settings.min_level;
        let dispenser = &self.dispensers[id];
        if dispenser.status(min_level) == DispenserStatus::Low {
            warn!(
                dispenser = %dispenser.name,
                level = %format_litres(dispenser.level()),
                "Purchase refused, dispenser below minimum level"
            );
            return Ok(PurchaseOutcome::LowLevel(LowLevelWarning {
                dispenser_id: id,
                dispenser_name: dispenser.name.clone(),
                level: dispenser.level(),
                min_level,
            }));
        }

        let fuel_type =
            FuelType::from_str(fuel).ok_or_else(|| StationError::InvalidFuelType(fuel.to_string()))?;

        let quote = quote(&self.prices, fuel_type, amount).map_err(|err| match err {
            QuoteError::NonPositivePrice { fuel, price } => StationError::InvalidPrice { fuel, price },
            other => StationError::InvalidAmount(other.to_string()),
        })?;

        let dispenser = &mut self.dispensers[id];
        let remaining_level = match dispenser.dispense(quote.litres) {
            Ok(remaining) => remaining,
            Err(DispenseError::ExceedsLevel {
                requested,
                available,
            }) => {
                let refilled = dispenser.refill();
                warn!(
                    dispenser = %dispenser.name,
                    requested = %format_litres(requested),
                    available = %format_litres(available),
                    refilled = %format_litres(refilled),
                    "Not enough petrol, dispenser topped up and purchase aborted"
                );
                return Err(StationError::InsufficientInventory {
                    dispenser: dispenser.name.clone(),
                    requested,
                    available,
                    refilled,
                });
            }
            Err(err @ DispenseError::NonPositive { .. }) => {
                return Err(StationError::InvalidAmount(err.to_string()));
            }
        };

        let receipt_number = self.next_receipt;
        self.next_receipt += 1;

        let sale = Sale::new(
            receipt_number,
            id,
            dispenser.name.clone(),
            fuel_type,
            quote.litres,
            quote.price_per_litre,
        );

        info!(
            receipt = sale.receipt_number,
            dispenser = %sale.dispenser_name,
            fuel = %sale.fuel,
            litres = %format_litres(sale.litres),
            total = %format_ringgit(sale.total_price),
            remaining = %format_litres(remaining_level),
            "Sale completed"
        );

        let receipt = self.record_receipt(&sale).await;
        if let Err(err) = &receipt {
            error!(
                receipt = sale.receipt_number,
                error = %err,
                "Receipt could not be stored; sale needs reconciliation"
            );
        }

        Ok(PurchaseOutcome::Completed(CompletedSale {
            sale,
            remaining_level,
            receipt,
        }))
    }

    /// Fill a dispenser to capacity. Returns the litres added.
    pub fn refill(&mut self, id: DispenserId) -> Result<Amount, StationError> {
        self.dispenser(id)?;

        let dispenser = &mut self.dispensers[id];
        let added = dispenser.refill();
        info!(
            dispenser = %dispenser.name,
            added = %format_litres(added),
            "Dispenser filled up"
        );
        Ok(added)
    }

    async fn record_receipt(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        let timeout = self.settings.receipt_timeout;
        let receipts = &self.receipts;

        retry_with_backoff(
            &self.settings.receipt_retry,
            || async move {
                match tokio::time::timeout(timeout, receipts.record(sale)).await {
                    Ok(result) => result,
                    Err(_) => Err(WriteError::TimedOut {
                        receipt: sale.receipt_number,
                    }),
                }
            },
            |_| true,
            "record_receipt",
        )
        .await
    }
}
