// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fuelstation::application::{DispenserLedger, LedgerSettings, RetryConfig};
use fuelstation::domain::{Amount, PriceTable, Sale};
use fuelstation::pricing::{FetchError, PriceSource};
use fuelstation::storage::{ReceiptSink, WriteError};
use rust_decimal_macros::dec;

/// Price source whose next answer is set by the test.
pub struct ScriptedPriceSource {
    response: Mutex<Result<PriceTable, FetchError>>,
    calls: AtomicUsize,
}

impl ScriptedPriceSource {
    pub fn new(response: Result<PriceTable, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn live(table: PriceTable) -> Arc<Self> {
        Self::new(Ok(table))
    }

    pub fn set(&self, response: Result<PriceTable, FetchError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

/// Price source that never answers in time.
pub struct HangingPriceSource;

#[async_trait]
impl PriceSource for HangingPriceSource {
    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(PriceTable::new(dec!(9), dec!(9), dec!(9)))
    }
}

/// Keeps recorded sales in memory.
#[derive(Default)]
pub struct MemoryReceiptSink {
    sales: Mutex<Vec<Sale>>,
}

impl MemoryReceiptSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sales(&self) -> Vec<Sale> {
        self.sales.lock().unwrap().clone()
    }

    pub fn receipt_numbers(&self) -> Vec<u64> {
        self.sales().iter().map(|sale| sale.receipt_number).collect()
    }
}

#[async_trait]
impl ReceiptSink for MemoryReceiptSink {
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        self.sales.lock().unwrap().push(sale.clone());
        Ok(PathBuf::from(format!("memory/receipt_{}", sale.receipt_number)))
    }
}

/// Fails the first `failures` attempts, then behaves like a memory sink.
pub struct FlakyReceiptSink {
    failures: usize,
    attempts: AtomicUsize,
    inner: MemoryReceiptSink,
}

impl FlakyReceiptSink {
    pub fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            attempts: AtomicUsize::new(0),
            inner: MemoryReceiptSink::default(),
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Self::new(usize::MAX)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sales(&self) -> Vec<Sale> {
        self.inner.sales()
    }
}

#[async_trait]
impl ReceiptSink for FlakyReceiptSink {
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(WriteError::Io {
                receipt: sale.receipt_number,
                message: "disk full".to_string(),
            });
        }
        self.inner.record(sale).await
    }
}

/// Default station with retries fast enough for tests.
pub fn test_settings() -> LedgerSettings {
    LedgerSettings {
        fetch_timeout: Duration::from_millis(200),
        receipt_timeout: Duration::from_millis(200),
        receipt_retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            backoff_multiplier: 2.0,
            max_delay_ms: 4,
        },
        ..LedgerSettings::default()
    }
}

/// RON95 at 2.00, RON97 at 2.50, Diesel at 1.60.
pub fn round_prices() -> PriceTable {
    PriceTable::new(dec!(2.00), dec!(2.50), dec!(1.60))
}

/// Ledger on a scripted live feed with an in-memory receipt sink.
pub async fn test_ledger(
    prices: PriceTable,
) -> (DispenserLedger, Arc<ScriptedPriceSource>, Arc<MemoryReceiptSink>) {
    let source = ScriptedPriceSource::live(prices);
    let receipts = MemoryReceiptSink::new();
    let ledger = DispenserLedger::start(test_settings(), source.clone(), receipts.clone())
        .await
        .unwrap();
    (ledger, source, receipts)
}

/// Assert every dispenser level lies within `0..=capacity`.
pub fn assert_levels_in_bounds(ledger: &DispenserLedger) {
    for (name, level) in ledger.levels() {
        assert!(
            level >= Amount::ZERO && level <= ledger.capacity(),
            "level of {} out of bounds: {}",
            name,
            level
        );
    }
}
