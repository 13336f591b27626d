//! HTTP client for the market snapshot endpoint.
//!
//! Fetches the 24h ticker list (`GET /api/v3/ticker/24hr` on Binance) and
//! hands the raw entries to the snapshot loader.

use crate::error::{FetchError, FetchResult};
use crate::snapshot::{RawTicker, SnapshotProvider};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Default snapshot endpoint.
pub const DEFAULT_SNAPSHOT_URL: &str = "https://api.binance.com/api/v3/ticker/24hr";

/// Snapshot provider backed by a REST endpoint.
pub struct HttpSnapshotProvider {
    /// HTTP client.
    client: Client,
    /// Snapshot endpoint URL.
    url: String,
}

impl HttpSnapshotProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `url` - snapshot endpoint returning a JSON array of tickers
    /// * `timeout` - optional request deadline; `None` waits indefinitely
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> FetchResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> FetchResult<Vec<RawTicker>> {
        info!(url = %self.url, "Fetching market snapshot");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(format!("Failed to parse response: {e}")))?;

        let entries = body
            .as_array()
            .ok_or_else(|| FetchError::Decode("snapshot response is not an array".to_string()))?;

        // Entries without a text symbol cannot be matched; skip them rather
        // than failing the whole market. Price shape is checked per tracked
        // instrument by the loader.
        let mut tickers = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<RawTicker>(entry.clone()) {
                Ok(ticker) => tickers.push(ticker),
                Err(e) => debug!(error = %e, "Skipping malformed snapshot entry"),
            }
        }

        info!(tickers = tickers.len(), "Market snapshot received");
        Ok(tickers)
    }
}

impl SnapshotProvider for HttpSnapshotProvider {
    fn fetch_market(&self) -> impl Future<Output = FetchResult<Vec<RawTicker>>> + Send {
        self.fetch()
    }
}
