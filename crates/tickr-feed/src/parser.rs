//! Message parsing for the price stream.
//!
//! Supports three payload shapes:
//! 1. Single miniTicker object: `{"e":"24hrMiniTicker","E":..,"s":"BTCUSDT","c":"60000.00",..}`
//! 2. Array of miniTicker objects (`!miniTicker@arr`)
//! 3. Combined stream wrapper: `{"stream":"btcusdt@miniTicker","data":{..}}`
//!
//! Only `s` (symbol) and `c` (last price) are consumed.

use crate::error::{FeedError, FeedResult};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tickr_core::{InstrumentId, Price, PriceTick};
use tracing::debug;

/// Parse counters.
#[derive(Debug, Default)]
pub struct ParseStats {
    /// Ticks extracted.
    pub parsed_count: AtomicU64,
    /// Payloads or array elements discarded.
    pub malformed_count: AtomicU64,
}

impl ParseStats {
    pub fn record_parsed(&self, n: u64) {
        self.parsed_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn parsed(&self) -> u64 {
        self.parsed_count.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.malformed_count.load(Ordering::Relaxed)
    }
}

/// Parser for miniTicker payloads.
#[derive(Debug, Default)]
pub struct MiniTickerParser {
    stats: ParseStats,
}

impl MiniTickerParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse one text payload into price ticks.
    ///
    /// Bad elements inside an array are skipped individually; the remaining
    /// elements are still returned.
    ///
    /// # Errors
    /// Returns an error if the payload as a whole is not usable.
    pub fn parse(&self, text: &str) -> FeedResult<Vec<PriceTick>> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            self.stats.record_malformed();
            FeedError::Json(e)
        })?;

        let result = self.parse_value(&value);
        match &result {
            Ok(ticks) => self.stats.record_parsed(ticks.len() as u64),
            Err(_) => self.stats.record_malformed(),
        }
        result
    }

    fn parse_value(&self, value: &Value) -> FeedResult<Vec<PriceTick>> {
        match value {
            Value::Array(items) => {
                let mut ticks = Vec::with_capacity(items.len());
                for item in items {
                    match parse_ticker(item) {
                        Ok(tick) => ticks.push(tick),
                        Err(e) => {
                            self.stats.record_malformed();
                            debug!(error = %e, "Skipping malformed ticker in array");
                        }
                    }
                }
                Ok(ticks)
            }
            Value::Object(map) if map.contains_key("stream") => {
                let data = map
                    .get("data")
                    .ok_or_else(|| FeedError::Malformed("stream wrapper without data".to_string()))?;
                self.parse_value(data)
            }
            Value::Object(_) => parse_ticker(value).map(|tick| vec![tick]),
            other => Err(FeedError::Malformed(format!(
                "unexpected payload type: {}",
                json_type(other)
            ))),
        }
    }
}

/// Parse a single miniTicker object.
fn parse_ticker(value: &Value) -> FeedResult<PriceTick> {
    let symbol = value
        .get("s")
        .and_then(Value::as_str)
        .ok_or_else(|| FeedError::Malformed("missing symbol".to_string()))?;

    let id = InstrumentId::new(symbol)
        .map_err(|_| FeedError::Malformed(format!("invalid symbol: {symbol:?}")))?;

    // Price is sent as text; accept a bare number too
    let raw_price = match value.get("c") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(FeedError::Malformed(format!("missing price for {id}"))),
    };

    let price = Price::parse_text(&raw_price).map_err(|_| FeedError::InvalidPrice {
        symbol: id.to_string(),
        value: raw_price.clone(),
    })?;

    Ok(PriceTick {
        id,
        price,
        event_time_ms: value.get("E").and_then(Value::as_i64),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
