//! Feed event dispatch.
//!
//! Every event from the transport goes through `FeedDispatcher::dispatch`.
//! Lifecycle events drive the connection state machine; message events are
//! parsed and filtered down to tracked instruments.

use crate::parser::MiniTickerParser;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tickr_core::{InstrumentId, PriceTick};
use tickr_ws::{ConnectionId, ConnectionState, ConnectionStateMachine, FeedEnvelope, FeedEvent};
use tracing::{debug, trace};

/// Why an event produced nothing for the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Payload could not be parsed.
    Malformed,
    /// Tick for an instrument that is not tracked.
    Untracked,
    /// Event from a connection that has been replaced.
    Stale,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Untracked => "untracked",
            Self::Stale => "stale",
        }
    }
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    StateChanged(ConnectionState),
    Price(PriceTick),
    Discarded(DiscardReason),
}

/// Dispatch counters.
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub events_count: AtomicU64,
    pub ticks_count: AtomicU64,
    pub discarded_count: AtomicU64,
}

impl DispatchStats {
    fn record_event(&self) {
        self.events_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_tick(&self) {
        self.ticks_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_discarded(&self) {
        self.discarded_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events(&self) -> u64 {
        self.events_count.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks_count.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.discarded_count.load(Ordering::Relaxed)
    }
}

/// Routes connection events for the current connection.
#[derive(Debug)]
pub struct FeedDispatcher {
    parser: MiniTickerParser,
    tracked: HashSet<InstrumentId>,
    state: ConnectionStateMachine,
    connection: Option<ConnectionId>,
    stats: DispatchStats,
}

impl FeedDispatcher {
    pub fn new(tracked: impl IntoIterator<Item = InstrumentId>) -> Self {
        Self {
            parser: MiniTickerParser::new(),
            tracked: tracked.into_iter().collect(),
            state: ConnectionStateMachine::new(),
            connection: None,
            stats: DispatchStats::default(),
        }
    }

    /// Start following a new connection. Events from any other connection
    /// are discarded from now on.
    pub fn begin_connection(&mut self, connection: ConnectionId) {
        debug!(%connection, "Dispatcher following new connection");
        self.connection = Some(connection);
        self.state = ConnectionStateMachine::new();
    }

    pub fn state(&self) -> ConnectionState {
        self.state.state()
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn parser(&self) -> &MiniTickerParser {
        &self.parser
    }

    /// Record a local close of the current connection.
    pub fn close(&mut self) -> Option<ConnectionState> {
        self.state.close()
    }

    /// Dispatch one event.
    pub fn dispatch(&mut self, envelope: &FeedEnvelope) -> Vec<FeedOutcome> {
        self.stats.record_event();

        if self.connection != Some(envelope.connection) {
            trace!(connection = %envelope.connection, kind = envelope.event.kind(), "Stale event");
            self.stats.record_discarded();
            return vec![FeedOutcome::Discarded(DiscardReason::Stale)];
        }

        match &envelope.event {
            FeedEvent::Message(text) => self.dispatch_message(text),
            event => self
                .state
                .apply(event)
                .map(FeedOutcome::StateChanged)
                .into_iter()
                .collect(),
        }
    }

    fn dispatch_message(&mut self, text: &str) -> Vec<FeedOutcome> {
        let ticks = match self.parser.parse(text) {
            Ok(ticks) => ticks,
            Err(e) => {
                debug!(error = %e, "Discarding malformed feed message");
                self.stats.record_discarded();
                return vec![FeedOutcome::Discarded(DiscardReason::Malformed)];
            }
        };

        ticks
            .into_iter()
            .map(|tick| {
                if self.tracked.contains(&tick.id) {
                    self.stats.record_tick();
                    FeedOutcome::Price(tick)
                } else {
                    trace!(id = %tick.id, "Tick for untracked instrument");
                    self.stats.record_discarded();
                    FeedOutcome::Discarded(DiscardReason::Untracked)
                }
            })
            .collect()
    }
}
