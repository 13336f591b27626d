//! Initial price snapshot.
//!
//! Pulls the full market from a request/response provider once and keeps
//! only the tracked instruments, in registry order.

use crate::error::{FetchError, FetchResult};
use crate::registry::InstrumentRegistry;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use tickr_core::{InstrumentId, Price, PriceRecord};
use tracing::{debug, info, warn};

/// One entry of the provider's market response.
///
/// Only the symbol and last price are consumed; everything else the
/// provider sends is ignored. The price is kept as raw JSON so a tracked
/// entry with a null or numeric price fails loudly instead of vanishing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTicker {
    pub symbol: String,
    #[serde(rename = "lastPrice", default)]
    pub last_price: Option<Value>,
}

impl RawTicker {
    pub fn new(symbol: impl Into<String>, last_price: impl Into<String>) -> Self {
        Self::with_raw_price(symbol, Some(Value::String(last_price.into())))
    }

    pub fn with_raw_price(symbol: impl Into<String>, last_price: Option<Value>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
        }
    }

    /// Parse the price; only decimal text is accepted.
    fn price(&self, id: &InstrumentId) -> FetchResult<Price> {
        let failure = |value: String| FetchError::ParseFailure {
            symbol: id.to_string(),
            value,
        };
        match &self.last_price {
            Some(Value::String(text)) => {
                Price::parse_text(text).map_err(|_| failure(text.clone()))
            }
            Some(other) => Err(failure(other.to_string())),
            None => Err(failure("missing".to_string())),
        }
    }
}

/// Request/response source of the full market snapshot.
pub trait SnapshotProvider {
    /// Fetch every ticker the provider knows about.
    fn fetch_market(&self) -> impl Future<Output = FetchResult<Vec<RawTicker>>> + Send;
}

/// Load one price record per tracked instrument.
///
/// Issues a single provider request. Tickers for untracked symbols are
/// dropped, repeated symbols keep their first occurrence, and the result is
/// ordered like the registry regardless of provider order.
///
/// # Errors
/// - provider errors are returned unchanged
/// - `FetchError::ParseFailure` if a tracked ticker has a missing, non-text
///   or unparsable price
/// - `FetchError::Empty` if no tracked instrument was in the response
pub async fn load_snapshot<P: SnapshotProvider>(
    provider: &P,
    registry: &InstrumentRegistry,
) -> FetchResult<Vec<PriceRecord>> {
    info!(instruments = registry.len(), "Loading price snapshot");

    let tickers = provider.fetch_market().await?;
    let total = tickers.len();

    let mut slots: Vec<Option<PriceRecord>> = vec![None; registry.len()];

    for ticker in tickers {
        // Symbols that cannot form an id cannot be tracked either.
        let Ok(id) = InstrumentId::new(&ticker.symbol) else {
            continue;
        };
        let Some(position) = registry.position(&id) else {
            continue;
        };
        if slots[position].is_some() {
            warn!(symbol = %id, "Duplicate ticker in snapshot, keeping first");
            continue;
        }

        let price = ticker.price(&id)?;

        let instrument = registry.instruments()[position].clone();
        slots[position] = Some(PriceRecord::new(instrument, price));
    }

    let records: Vec<PriceRecord> = slots.into_iter().flatten().collect();

    debug!(
        provider_tickers = total,
        matched = records.len(),
        "Snapshot filtered to tracked instruments"
    );

    if records.is_empty() {
        warn!("Snapshot contained none of the tracked instruments");
        return Err(FetchError::Empty);
    }

    if records.len() < registry.len() {
        let missing: Vec<&str> = registry
            .ids()
            .filter(|id| !records.iter().any(|r| r.id() == *id))
            .map(InstrumentId::as_str)
            .collect();
        warn!(?missing, "Some tracked instruments were not in the snapshot");
    }

    info!(records = records.len(), "Price snapshot loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InstrumentSpec;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning a canned response and counting calls.
    struct FakeProvider {
        response: Result<Vec<RawTicker>, u16>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn ok(tickers: Vec<RawTicker>) -> Self {
            Self {
                response: Ok(tickers),
                calls: AtomicUsize::new(0),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                response: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SnapshotProvider for FakeProvider {
        fn fetch_market(&self) -> impl Future<Output = FetchResult<Vec<RawTicker>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = match &self.response {
                Ok(tickers) => Ok(tickers.clone()),
                Err(status) => Err(FetchError::Status {
                    status: *status,
                    body: String::new(),
                }),
            };
            async move { response }
        }
    }

    fn registry(ids: &[&str]) -> InstrumentRegistry {
        let specs: Vec<InstrumentSpec> = ids.iter().map(|id| InstrumentSpec::new(*id, None)).collect();
        InstrumentRegistry::new(&specs).unwrap()
    }

    fn ids(records: &[PriceRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id().as_str()).collect()
    }

    #[test]
    fn test_registry_order_not_provider_order() {
        let provider = FakeProvider::ok(vec![
            RawTicker::new("SHIBUSDT", "0.00001200"),
            RawTicker::new("LTCUSDT", "80.1"),
            RawTicker::new("BTCUSDT", "60000.00"),
            RawTicker::new("ETHUSDT", "3000.5"),
        ]);
        let registry = registry(&["BTCUSDT", "ETHUSDT", "SHIBUSDT"]);

        let records = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap();

        assert_eq!(ids(&records), vec!["BTCUSDT", "ETHUSDT", "SHIBUSDT"]);
        assert_eq!(records[0].current_price, Price::new(dec!(60000)));
        assert_eq!(records[2].current_price, Price::new(dec!(0.000012)));
        assert!(records.iter().all(|r| r.previous_price.is_none()));
        assert!(records.iter().all(|r| r.ui_handle.is_none()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_instruments_are_skipped() {
        let provider = FakeProvider::ok(vec![RawTicker::new("ETHUSDT", "3000")]);
        let registry = registry(&["BTCUSDT", "ETHUSDT"]);

        let records = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap();

        assert_eq!(ids(&records), vec!["ETHUSDT"]);
    }

    #[test]
    fn test_symbol_case_is_normalized() {
        let provider = FakeProvider::ok(vec![RawTicker::new("btcusdt", "1")]);
        let registry = registry(&["BTCUSDT"]);

        let records = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap();

        assert_eq!(ids(&records), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_duplicate_ticker_keeps_first() {
        let provider = FakeProvider::ok(vec![
            RawTicker::new("BTCUSDT", "1"),
            RawTicker::new("BTCUSDT", "2"),
        ]);
        let registry = registry(&["BTCUSDT"]);

        let records = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].current_price, Price::ONE);
    }

    #[test]
    fn test_no_tracked_instruments_is_empty_error() {
        let provider = FakeProvider::ok(vec![RawTicker::new("LTCUSDT", "80")]);
        let registry = registry(&["BTCUSDT"]);

        let err = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap_err();

        assert!(matches!(err, FetchError::Empty));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_parse_failure_is_not_coerced() {
        let provider = FakeProvider::ok(vec![
            RawTicker::new("BTCUSDT", "60000"),
            RawTicker::new("ETHUSDT", "n/a"),
        ]);
        let registry = registry(&["BTCUSDT", "ETHUSDT"]);

        let err = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap_err();

        match err {
            FetchError::ParseFailure { symbol, value } => {
                assert_eq!(symbol, "ETHUSDT");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_untracked_price_is_ignored() {
        let provider = FakeProvider::ok(vec![
            RawTicker::new("LTCUSDT", "garbage"),
            RawTicker::new("BTCUSDT", "60000"),
        ]);
        let registry = registry(&["BTCUSDT"]);

        assert!(tokio_test::block_on(load_snapshot(&provider, &registry)).is_ok());
    }

    #[test]
    fn test_tracked_non_text_price_is_parse_failure() {
        let provider = FakeProvider::ok(vec![
            RawTicker::with_raw_price("BTCUSDT", Some(Value::Null)),
            RawTicker::with_raw_price("ETHUSDT", Some(serde_json::json!(3000.5))),
        ]);
        let registry = registry(&["BTCUSDT", "ETHUSDT"]);

        let err = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap_err();

        match err {
            FetchError::ParseFailure { symbol, value } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(value, "null");
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_tracked_missing_price_is_parse_failure() {
        let provider = FakeProvider::ok(vec![
            RawTicker::new("BTCUSDT", "60000"),
            RawTicker::with_raw_price("ETHUSDT", None),
        ]);
        let registry = registry(&["BTCUSDT", "ETHUSDT"]);

        let err = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap_err();

        assert!(matches!(
            err,
            FetchError::ParseFailure { ref symbol, .. } if symbol == "ETHUSDT"
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_untracked_non_text_price_is_ignored() {
        let provider = FakeProvider::ok(vec![
            RawTicker::with_raw_price("LTCUSDT", Some(Value::Null)),
            RawTicker::new("BTCUSDT", "60000"),
        ]);
        let registry = registry(&["BTCUSDT"]);

        let records = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap();

        assert_eq!(ids(&records), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_status_error_propagates() {
        let provider = FakeProvider::status(503);
        let registry = registry(&["BTCUSDT"]);

        let err = tokio_test::block_on(load_snapshot(&provider, &registry)).unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_raw_ticker_ignores_extra_fields() {
        let json = r#"{"symbol":"BTCUSDT","priceChange":"-1.0","lastPrice":"60000.00","count":5}"#;
        let ticker: RawTicker = serde_json::from_str(json).unwrap();
        assert_eq!(ticker, RawTicker::new("BTCUSDT", "60000.00"));
    }
}
