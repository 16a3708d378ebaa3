pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pricing;
pub mod storage;

pub use application::{DispenserLedger, LedgerSettings, PurchaseOutcome, StationError};
pub use domain::*;
