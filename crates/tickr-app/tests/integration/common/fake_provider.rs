//! Scripted snapshot provider.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tickr_registry::{FetchError, FetchResult, RawTicker, SnapshotProvider};

enum Response {
    Tickers(Vec<RawTicker>),
    Status(u16),
    Transport,
}

/// Answers every fetch with the same scripted response.
pub struct FakeProvider {
    response: Response,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with_prices(prices: &[(&str, &str)]) -> Self {
        let tickers = prices
            .iter()
            .map(|(symbol, price)| RawTicker::new(*symbol, *price))
            .collect();
        Self::new(Response::Tickers(tickers))
    }

    pub fn status(status: u16) -> Self {
        Self::new(Response::Status(status))
    }

    pub fn unreachable() -> Self {
        Self::new(Response::Transport)
    }

    fn new(response: Response) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotProvider for FakeProvider {
    fn fetch_market(&self) -> impl Future<Output = FetchResult<Vec<RawTicker>>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = match &self.response {
            Response::Tickers(tickers) => Ok(tickers.clone()),
            Response::Status(status) => Err(FetchError::Status {
                status: *status,
                body: "unavailable".to_string(),
            }),
            Response::Transport => Err(FetchError::Transport("connection refused".to_string())),
        };
        async move { response }
    }
}
