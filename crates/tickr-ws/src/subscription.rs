//! Stream subscription.
//!
//! The provider multiplexes several instruments on one connection by
//! listing their stream names in the URL path:
//! `<base>/btcusdt@miniTicker/ethusdt@miniTicker`.

use crate::error::{WsError, WsResult};
use std::collections::HashSet;
use tickr_core::InstrumentId;

/// Per-instrument stream carrying the latest price.
pub const MINI_TICKER_STREAM: &str = "miniTicker";

/// Set of stream names for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSubscription {
    streams: Vec<String>,
}

impl StreamSubscription {
    /// Build a subscription covering exactly the given instruments.
    ///
    /// Order is preserved and repeated ids are subscribed once.
    pub fn new<'a>(instruments: impl IntoIterator<Item = &'a InstrumentId>) -> WsResult<Self> {
        let mut seen = HashSet::new();
        let streams: Vec<String> = instruments
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(|id| format!("{}@{}", id.to_stream_name(), MINI_TICKER_STREAM))
            .collect();

        if streams.is_empty() {
            return Err(WsError::NoInstruments);
        }

        Ok(Self { streams })
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Full stream URL under `base`.
    pub fn url(&self, base: &str) -> WsResult<String> {
        let base = base.trim().trim_end_matches('/');
        if !(base.starts_with("ws://") || base.starts_with("wss://")) {
            return Err(WsError::InvalidUrl(base.to_string()));
        }
        Ok(format!("{}/{}", base, self.streams.join("/")))
    }
}
