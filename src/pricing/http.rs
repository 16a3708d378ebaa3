use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{parse_feed, FetchError, PriceSource};
use crate::domain::PriceTable;

/// Public fuel price catalogue.
pub const DEFAULT_FEED_URL: &str = "https://api.data.gov.my/data-catalogue/?id=fuelprice&limit=1";

/// Reads the price table from a JSON feed over HTTP.
pub struct HttpPriceSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPriceSource {
    /// Create a source for `url`. Requests that take longer than `timeout`
    /// fail with [`FetchError::Transport`].
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        debug!(url = %self.url, "Fetching fuel prices");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_feed(&body)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on a random local port.
    async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/fuelprice", addr)
    }

    #[tokio::test]
    async fn test_fetch_parses_successful_response() {
        let url = serve_once("200 OK", r#"[{"ron95": "2.05", "ron97": "3.47", "diesel": "2.15"}]"#).await;
        let source = HttpPriceSource::new(url, Duration::from_secs(2)).unwrap();

        let table = source.fetch().await.unwrap();

        assert_eq!(table, PriceTable::new(dec!(2.05), dec!(3.47), dec!(2.15)));
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let url = serve_once("500 Internal Server Error", "").await;
        let source = HttpPriceSource::new(url, Duration::from_secs(2)).unwrap();

        assert_eq!(source.fetch().await, Err(FetchError::BadStatus(500)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unexpected_body() {
        let url = serve_once("200 OK", r#"{"petrol": 1.0}"#).await;
        let source = HttpPriceSource::new(url, Duration::from_secs(2)).unwrap();

        assert!(matches!(
            source.fetch().await,
            Err(FetchError::MalformedPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpPriceSource::new(format!("http://{}/fuelprice", addr), Duration::from_secs(2))
                .unwrap();

        assert!(matches!(source.fetch().await, Err(FetchError::Transport(_))));
    }
}
