//! Price sources: where the station gets its price-per-litre table.
//!
//! A source either returns a complete [`PriceTable`] or fails. What happens
//! after a failure (the fallback table) is decided by the ledger, not here.

mod fixed;
mod http;

pub use fixed::*;
pub use http::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::PriceTable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Bad HTTP status: {0}")]
    BadStatus(u16),

    #[error("Malformed price payload: {0}")]
    MalformedPayload(String),
}

/// Supplies the current price table.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceTable, FetchError>;
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Box<T> {
    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Arc<T> {
    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        (**self).fetch().await
    }
}

/// Parse a price feed body.
///
/// Accepts a JSON object with exactly the keys `ron95`, `ron97` and `diesel`,
/// or a one-element array holding such an object. Prices may be numbers or
/// decimal strings. Anything else is a [`FetchError::MalformedPayload`].
pub fn parse_feed(body: &str) -> Result<PriceTable, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    let record = match value {
        Value::Array(mut records) => {
            if records.len() != 1 {
                return Err(FetchError::MalformedPayload(format!(
                    "expected exactly one price record, found {}",
                    records.len()
                )));
            }
            records.remove(0)
        }
        record @ Value::Object(_) => record,
        other => {
            return Err(FetchError::MalformedPayload(format!(
                "expected an object, found {}",
                json_kind(&other)
            )));
        }
    };

    serde_json::from_value(record).map_err(|e| FetchError::MalformedPayload(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
