use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::domain::{ReceiptNumber, Sale};

/// Default directory receipts are written to.
pub const DEFAULT_RECEIPT_DIR: &str = "receipts";

/// Default receipt file name prefix.
pub const DEFAULT_RECEIPT_PREFIX: &str = "receipt";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("Failed to write receipt {receipt}: {message}")]
    Io {
        receipt: ReceiptNumber,
        message: String,
    },

    #[error("Timed out writing receipt {receipt}")]
    TimedOut { receipt: ReceiptNumber },
}

/// Durably records finished sales.
#[async_trait]
pub trait ReceiptSink: Send + Sync {
    /// Record `sale` and return where it was stored.
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError>;
}

#[async_trait]
impl<T: ReceiptSink + ?Sized> ReceiptSink for Box<T> {
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        (**self).record(sale).await
    }
}

#[async_trait]
impl<T: ReceiptSink + ?Sized> ReceiptSink for Arc<T> {
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        (**self).record(sale).await
    }
}

/// Writes one text file per receipt, `<dir>/<prefix>_<number>.txt`.
#[derive(Debug, Clone)]
pub struct FileReceiptSink {
    directory: PathBuf,
    prefix: String,
}

impl FileReceiptSink {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the file for a receipt number.
    pub fn path_for(&self, receipt: ReceiptNumber) -> PathBuf {
        self.directory.join(format!("{}_{}.txt", self.prefix, receipt))
    }

    async fn write(&self, sale: &Sale) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(sale.receipt_number);
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(sale.receipt_text().as_bytes()).await?;
        file.sync_all().await?;
        Ok(path)
    }
}

impl Default for FileReceiptSink {
    fn default() -> Self {
        Self::new(DEFAULT_RECEIPT_DIR, DEFAULT_RECEIPT_PREFIX)
    }
}

#[async_trait]
impl ReceiptSink for FileReceiptSink {
    async fn record(&self, sale: &Sale) -> Result<PathBuf, WriteError> {
        self.write(sale).await.map_err(|e| WriteError::Io {
            receipt: sale.receipt_number,
            message: e.to_string(),
        })
    }
}
