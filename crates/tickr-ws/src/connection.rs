//! Feed connection.
//!
//! `FeedConnector::connect` returns immediately in `Connecting`; the
//! handshake and the read loop run on a spawned transport task that reports
//! everything as `FeedEnvelope`s. The task ends after emitting exactly one
//! `Closed` event.

use crate::error::WsResult;
use crate::message::{ConnectionId, FeedEnvelope, FeedEvent, CLOSE_ABNORMAL, CLOSE_NORMAL};
use crate::subscription::StreamSubscription;
use futures_util::{SinkExt, StreamExt};
use tickr_core::InstrumentId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Opens feed connections against one stream endpoint.
#[derive(Debug)]
pub struct FeedConnector {
    /// Base stream URL (e.g. "wss://stream.binance.com:9443/ws").
    base_url: String,
    next_id: u64,
}

impl FeedConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            next_id: 1,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open one connection subscribed to exactly `instruments`.
    ///
    /// Events for the connection are sent to `event_tx`. Must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    /// - `WsError::NoInstruments` if `instruments` is empty (no connection is opened)
    /// - `WsError::InvalidUrl` if the base URL is not a ws/wss URL
    pub fn connect<'a>(
        &mut self,
        instruments: impl IntoIterator<Item = &'a InstrumentId>,
        event_tx: mpsc::Sender<FeedEnvelope>,
    ) -> WsResult<ConnectionHandle> {
        let subscription = StreamSubscription::new(instruments)?;
        let url = subscription.url(&self.base_url)?;

        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        info!(connection = %id, streams = subscription.len(), "Opening feed connection");

        let token = CancellationToken::new();
        let task = tokio::spawn(run_transport(id, url, event_tx, token.clone()));

        Ok(ConnectionHandle {
            id,
            token,
            task: Some(task),
        })
    }
}

/// Owner of one live connection.
///
/// Dropping the handle disconnects it.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Request a graceful close. Idempotent.
    pub fn disconnect(&self) {
        if !self.token.is_cancelled() {
            info!(connection = %self.id, "Feed disconnect requested");
            self.token.cancel();
        }
    }

    pub fn is_disconnect_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the transport task to finish.
    pub async fn closed(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(connection = %self.id, ?e, "Feed transport task failed");
            }
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Send an event to the session. Returns false if the receiver is gone.
async fn emit(tx: &mpsc::Sender<FeedEnvelope>, id: ConnectionId, event: FeedEvent) -> bool {
    if tx.send(FeedEnvelope::new(id, event)).await.is_err() {
        debug!(connection = %id, "Feed event receiver dropped");
        return false;
    }
    true
}

async fn run_transport(
    id: ConnectionId,
    url: String,
    tx: mpsc::Sender<FeedEnvelope>,
    token: CancellationToken,
) {
    debug!(connection = %id, %url, "Connecting to stream");

    // TCP_NODELAY for lower latency
    let ws_stream = tokio::select! {
        biased;

        () = token.cancelled() => {
            info!(connection = %id, "Disconnected before handshake completed");
            emit(&tx, id, FeedEvent::client_closed()).await;
            return;
        }

        result = connect_async_tls_with_config(url.as_str(), None, true, None) => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                error!(connection = %id, ?e, "Feed connection failed");
                if emit(&tx, id, FeedEvent::TransportError(e.to_string())).await {
                    emit(
                        &tx,
                        id,
                        FeedEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: "connection failed".to_string(),
                        },
                    )
                    .await;
                }
                return;
            }
        },
    };

    info!(connection = %id, "Feed connected");
    if !emit(&tx, id, FeedEvent::Opened).await {
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            // Shutdown signal - highest priority
            () = token.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    warn!(connection = %id, ?e, "Failed to send Close frame during disconnect");
                }
                emit(&tx, id, FeedEvent::client_closed()).await;
                return;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !emit(&tx, id, FeedEvent::Message(text)).await {
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        debug!(connection = %id, "Received ping, sending pong");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!(connection = %id, ?e, "Failed to send pong");
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!(connection = %id, len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (f.code.into(), f.reason.to_string()))
                            .unwrap_or((CLOSE_NORMAL, "Normal close".to_string()));
                        warn!(connection = %id, code, %reason, "Feed closed by server");
                        emit(&tx, id, FeedEvent::Closed { code, reason }).await;
                        return;
                    }
                    Some(Err(e)) => {
                        error!(connection = %id, ?e, "Feed read error");
                        if emit(&tx, id, FeedEvent::TransportError(e.to_string())).await {
                            emit(
                                &tx,
                                id,
                                FeedEvent::Closed {
                                    code: CLOSE_ABNORMAL,
                                    reason: "read error".to_string(),
                                },
                            )
                            .await;
                        }
                        return;
                    }
                    None => {
                        warn!(connection = %id, "Feed stream ended");
                        emit(
                            &tx,
                            id,
                            FeedEvent::Closed {
                                code: CLOSE_ABNORMAL,
                                reason: "stream ended".to_string(),
                            },
                        )
                        .await;
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WsError;

    #[tokio::test]
    async fn test_connect_without_instruments_opens_nothing() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut connector = FeedConnector::new("ws://127.0.0.1:1");

        let result = connector.connect(&Vec::<InstrumentId>::new(), tx);

        assert!(matches!(result, Err(WsError::NoInstruments)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connection_ids_increase() {
        let (tx, _rx) = mpsc::channel(8);
        let mut connector = FeedConnector::new("ws://127.0.0.1:1");
        let ids = vec![InstrumentId::new("BTCUSDT").unwrap()];

        let first = connector.connect(&ids, tx.clone()).unwrap();
        let second = connector.connect(&ids, tx).unwrap();

        assert!(second.id() > first.id());
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_close() {
        let (tx, mut rx) = mpsc::channel(8);
        // Port 1 is never listening
        let mut connector = FeedConnector::new("ws://127.0.0.1:1");
        let ids = vec![InstrumentId::new("BTCUSDT").unwrap()];

        let mut handle = connector.connect(&ids, tx).unwrap();
        handle.closed().await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.connection, handle.id());
        assert!(matches!(first.event, FeedEvent::TransportError(_)));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second.event, FeedEvent::Closed { code: 1006, .. }));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (tx, _rx) = mpsc::channel(8);
        let mut connector = FeedConnector::new("ws://127.0.0.1:1");
        let ids = vec![InstrumentId::new("BTCUSDT").unwrap()];

        let mut handle = connector.connect(&ids, tx).unwrap();
        handle.disconnect();
        handle.disconnect();
        assert!(handle.is_disconnect_requested());
        handle.closed().await;
        handle.closed().await;
    }
}
