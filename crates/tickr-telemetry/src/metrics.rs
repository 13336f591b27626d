//! Prometheus metrics for tickr.
//!
//! Covers:
//! - Feed connection state and reconnects
//! - Feed events and discarded payloads
//! - Price updates by direction
//! - Snapshot loads
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

/// Feed connection state (0=connecting, 1=open, 2=error, 3=closed).
pub static FEED_STATE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "tickr_feed_state",
        "Feed connection state (0=connecting, 1=open, 2=error, 3=closed)"
    )
    .unwrap()
});

/// Total feed events received.
/// Labels: kind (opened/message/transport_error/closed)
pub static FEED_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickr_feed_events_total",
        "Total feed events received",
        &["kind"]
    )
    .unwrap()
});

/// Total feed payloads or ticks discarded.
/// Labels: reason (malformed/untracked/stale)
pub static FEED_DISCARDED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickr_feed_discarded_total",
        "Total feed payloads or ticks discarded",
        &["reason"]
    )
    .unwrap()
});

/// Total feed reconnection attempts.
pub static FEED_RECONNECT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickr_feed_reconnect_total",
        "Total feed reconnection attempts",
        &["reason"]
    )
    .unwrap()
});

/// Total price updates applied.
/// Labels: direction (up/down/unchanged)
pub static PRICE_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickr_price_updates_total",
        "Total price updates applied to the board",
        &["direction"]
    )
    .unwrap()
});

/// Total snapshot loads.
/// Labels: result (ok/status/transport/decode/empty/parse_failure)
pub static SNAPSHOT_LOADS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickr_snapshot_loads_total",
        "Total snapshot loads by result",
        &["result"]
    )
    .unwrap()
});

/// Snapshot load latency in milliseconds.
pub static SNAPSHOT_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tickr_snapshot_latency_ms",
        "Snapshot load latency in milliseconds",
        &["result"],
        vec![50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Number of cards visible under the current filter.
pub static VISIBLE_CARDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "tickr_visible_cards",
        "Number of cards visible under the current filter"
    )
    .unwrap()
});

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    /// Set feed connection state.
    pub fn feed_state_set(state: i64) {
        FEED_STATE.set(state);
    }

    /// Record a feed event.
    pub fn feed_event(kind: &str) {
        FEED_EVENTS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a discarded payload or tick.
    pub fn feed_discarded(reason: &str) {
        FEED_DISCARDED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a feed reconnection.
    pub fn feed_reconnect(reason: &str) {
        FEED_RECONNECT_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record an applied price update.
    pub fn price_update(direction: &str) {
        PRICE_UPDATES_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record a snapshot load and its latency.
    pub fn snapshot_load(result: &str, latency_ms: f64) {
        SNAPSHOT_LOADS_TOTAL.with_label_values(&[result]).inc();
        SNAPSHOT_LATENCY_MS
            .with_label_values(&[result])
            .observe(latency_ms);
    }

    /// Set the number of visible cards.
    pub fn visible_cards_set(count: i64) {
        VISIBLE_CARDS.set(count);
    }

    /// Encode all registered metrics in the text exposition format.
    pub fn encode_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
