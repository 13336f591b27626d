//! Price board session.
//!
//! A `Session` owns everything one board needs: the tracked instruments,
//! the view model, the renderer over a surface, the filter, and at most one
//! live feed connection. All mutation happens from the owner's event loop,
//! one event at a time.

use crate::config::AppConfig;
use crate::error::AppResult;
use std::time::Instant as StdInstant;
use tickr_core::{PriceRecord, PriceTick, UpdateResult};
use tickr_dashboard::{FilterController, Renderer, StatusTone, UiSurface};
use tickr_feed::{FeedDispatcher, FeedOutcome, ViewModel};
use tickr_registry::{load_snapshot, FetchError, FetchResult, InstrumentRegistry, SnapshotProvider};
use tickr_telemetry::Metrics;
use tickr_ws::{
    BackoffPolicy, ConnectionHandle, ConnectionId, ConnectionState, FeedConnector, FeedEnvelope,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Capacity of the transport-to-session event channel.
const FEED_CHANNEL_CAPACITY: usize = 1024;

pub const STATUS_FETCHING: &str = "Fetching initial prices...";
pub const STATUS_CONNECTING: &str = "Connecting to real-time feed...";
pub const STATUS_LIVE: &str = "Live Feed Connected";
pub const STATUS_FEED_ERROR: &str = "WebSocket connection error.";
pub const STATUS_DISCONNECTED: &str = "WebSocket disconnected.";
pub const STATUS_SNAPSHOT_ERROR: &str = "Error fetching initial data.";
pub const STATUS_NO_SYMBOLS: &str = "No symbols to track.";

/// How startup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Cards rendered and the feed is connecting.
    Connecting,
    /// The snapshot held none of the tracked instruments.
    Empty,
    /// The snapshot failed; the board shows the error placeholder.
    Failed,
}

pub struct Session<P: SnapshotProvider, S: UiSurface> {
    registry: InstrumentRegistry,
    provider: P,
    renderer: Renderer<S>,
    view_model: ViewModel,
    filter: FilterController,
    connector: FeedConnector,
    dispatcher: FeedDispatcher,
    connection: Option<ConnectionHandle>,
    event_tx: mpsc::Sender<FeedEnvelope>,
    backoff: BackoffPolicy,
    reconnect_enabled: bool,
    reconnect_at: Option<Instant>,
    shutting_down: bool,
}

impl<P: SnapshotProvider, S: UiSurface> Session<P, S> {
    /// Create a session and the receiver its feed events arrive on.
    ///
    /// The owner forwards every received envelope to `handle_feed`.
    pub fn new(
        config: &AppConfig,
        registry: InstrumentRegistry,
        provider: P,
        surface: S,
    ) -> (Self, mpsc::Receiver<FeedEnvelope>) {
        let (event_tx, event_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let dispatcher = FeedDispatcher::new(registry.ids().cloned());

        let session = Self {
            registry,
            provider,
            renderer: Renderer::new(surface, config.display.pulse_duration()),
            view_model: ViewModel::new(),
            filter: FilterController::new(),
            connector: FeedConnector::new(config.ws_url.clone()),
            dispatcher,
            connection: None,
            event_tx,
            backoff: config.websocket.backoff(),
            reconnect_enabled: config.websocket.reconnect,
            reconnect_at: None,
            shutting_down: false,
        };
        (session, event_rx)
    }

    /// Load the snapshot, render it, then open the feed.
    pub async fn start(&mut self) -> StartOutcome {
        self.begin_loading();
        let result = self.fetch_snapshot().await;
        self.complete_start(result)
    }

    /// Show the loading state.
    pub fn begin_loading(&mut self) {
        self.renderer.render_status(STATUS_FETCHING, StatusTone::Info);
        self.renderer.render_loading();
    }

    /// Fetch the initial snapshot for the tracked instruments.
    pub async fn fetch_snapshot(&self) -> FetchResult<Vec<PriceRecord>> {
        let started = StdInstant::now();
        let result = load_snapshot(&self.provider, &self.registry).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        Metrics::snapshot_load(label, latency_ms);
        result
    }

    /// Render the snapshot result. The feed is only opened after a
    /// successful snapshot.
    pub fn complete_start(&mut self, result: FetchResult<Vec<PriceRecord>>) -> StartOutcome {
        match result {
            Ok(records) => {
                let count = self.view_model.initialize(records);
                self.render_board();
                info!(records = count, "Initial prices rendered");

                self.renderer
                    .render_status(STATUS_CONNECTING, StatusTone::Info);
                if let Err(e) = self.open_feed() {
                    error!(error = %e, "Failed to open feed");
                    self.renderer
                        .render_status(STATUS_FEED_ERROR, StatusTone::Error);
                }
                StartOutcome::Connecting
            }
            Err(FetchError::Empty) => {
                warn!("Snapshot contained no tracked instruments");
                self.view_model.initialize(Vec::new());
                self.render_board();
                self.renderer.render_status(STATUS_NO_SYMBOLS, StatusTone::Info);
                StartOutcome::Empty
            }
            Err(e) => {
                error!(error = %e, "Failed to load initial prices");
                self.renderer.render_error();
                self.renderer
                    .render_status(STATUS_SNAPSHOT_ERROR, StatusTone::Error);
                StartOutcome::Failed
            }
        }
    }

    fn render_board(&mut self) {
        self.renderer.render_all(&mut self.view_model);
        let visible = self
            .filter
            .reapply(&self.view_model, self.renderer.surface_mut());
        Metrics::visible_cards_set(visible as i64);
    }

    /// Open a feed connection for the instruments the snapshot loaded.
    ///
    /// Tracked instruments missing from the snapshot have no card and are
    /// not subscribed. Any prior connection is closed first; its remaining events are
    /// discarded as stale.
    pub fn open_feed(&mut self) -> AppResult<ConnectionId> {
        if let Some(previous) = self.connection.take() {
            info!(connection = %previous.id(), "Closing previous feed connection");
            previous.disconnect();
            self.dispatcher.close();
        }

        let loaded = self.view_model.all().iter().map(PriceRecord::id);
        let handle = self.connector.connect(loaded, self.event_tx.clone())?;
        let id = handle.id();
        self.dispatcher.begin_connection(id);
        Metrics::feed_state_set(ConnectionState::Connecting.as_gauge());
        self.connection = Some(handle);
        Ok(id)
    }

    /// Process one event from the transport.
    pub fn handle_feed(&mut self, envelope: FeedEnvelope) {
        Metrics::feed_event(envelope.event.kind());

        for outcome in self.dispatcher.dispatch(&envelope) {
            match outcome {
                FeedOutcome::Price(tick) => self.apply_tick(tick),
                FeedOutcome::StateChanged(state) => self.on_state_change(state),
                FeedOutcome::Discarded(reason) => Metrics::feed_discarded(reason.as_str()),
            }
        }
    }

    fn apply_tick(&mut self, tick: PriceTick) {
        match self.view_model.apply_update(&tick.id, tick.price) {
            UpdateResult::Ignored => {
                // Tracked but absent from the snapshot
                trace!(id = %tick.id, "No record for tick");
                Metrics::feed_discarded("no_record");
            }
            UpdateResult::Applied(direction) => {
                if let Some(record) = self.view_model.get(&tick.id) {
                    self.renderer.render_update(record, direction);
                }
                Metrics::price_update(direction.as_str());
            }
        }
    }

    fn on_state_change(&mut self, state: ConnectionState) {
        Metrics::feed_state_set(state.as_gauge());

        match state {
            ConnectionState::Connecting => {}
            ConnectionState::Open => {
                info!(connection = ?self.connection_id(), "Feed connected");
                self.backoff.reset();
                self.reconnect_at = None;
                self.renderer.render_status(STATUS_LIVE, StatusTone::Live);
            }
            ConnectionState::Error => {
                warn!(connection = ?self.connection_id(), "Feed transport error");
                self.renderer
                    .render_status(STATUS_FEED_ERROR, StatusTone::Error);
            }
            ConnectionState::Closed => {
                info!(connection = ?self.connection_id(), "Feed closed");
                self.connection = None;
                self.renderer
                    .render_status(STATUS_DISCONNECTED, StatusTone::Warning);
                if self.reconnect_enabled && !self.shutting_down {
                    self.schedule_reconnect();
                }
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        match self.backoff.next_delay() {
            Some(delay) => {
                info!(
                    attempt = self.backoff.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling feed reconnect"
                );
                Metrics::feed_reconnect("scheduled");
                self.reconnect_at = Some(Instant::now() + delay);
            }
            None => {
                warn!(attempts = self.backoff.attempt(), "Reconnect attempts exhausted");
                Metrics::feed_reconnect("exhausted");
                self.reconnect_at = None;
            }
        }
    }

    /// When the pending reconnect is due, if any.
    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Run the pending reconnect now.
    pub fn reconnect(&mut self) {
        if self.shutting_down {
            return;
        }
        self.reconnect_at = None;
        Metrics::feed_reconnect("attempt");
        self.renderer
            .render_status(STATUS_CONNECTING, StatusTone::Info);
        if let Err(e) = self.open_feed() {
            error!(error = %e, "Feed reconnect failed");
            self.renderer
                .render_status(STATUS_FEED_ERROR, StatusTone::Error);
        }
    }

    /// Apply a search query. Returns the number of visible cards.
    pub fn apply_filter(&mut self, query: &str) -> usize {
        let visible =
            self.filter
                .apply_filter(&self.view_model, self.renderer.surface_mut(), query);
        Metrics::visible_cards_set(visible as i64);
        visible
    }

    /// Close the feed for good.
    pub async fn shutdown(&mut self) {
        self.shutting_down = true;
        self.reconnect_at = None;

        if let Some(mut handle) = self.connection.take() {
            handle.disconnect();
            handle.closed().await;
        }
        if let Some(state) = self.dispatcher.close() {
            Metrics::feed_state_set(state.as_gauge());
        }

        let stats = self.dispatcher.stats();
        info!(
            events = stats.events(),
            ticks = stats.ticks(),
            discarded = stats.discarded(),
            "Session shut down"
        );
        match Metrics::encode_text() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.renderer.surface_mut()
    }

    /// Id of the live connection, if one is open or opening.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(ConnectionHandle::id)
    }

    pub fn feed_state(&self) -> ConnectionState {
        self.dispatcher.state()
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }
}
