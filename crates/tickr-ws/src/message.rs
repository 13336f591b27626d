//! Connection events.
//!
//! The transport task never calls back into the session. Everything it
//! observes becomes a `FeedEvent`, tagged with the id of the connection that
//! produced it, and is sent over a channel.

use std::fmt;

/// Identifies one physical connection.
///
/// Ids are minted in increasing order by the connector, so the session can
/// drop events from a connection it has already replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Handshake completed.
    Opened,
    /// Raw text payload from the provider.
    Message(String),
    /// Transport-level failure. Does not by itself close the connection.
    TransportError(String),
    /// Connection ended, by either side.
    Closed { code: u16, reason: String },
}

impl FeedEvent {
    /// Close event for a client-initiated disconnect.
    pub fn client_closed() -> Self {
        Self::Closed {
            code: CLOSE_NORMAL,
            reason: "client disconnect".to_string(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Message(_) => "message",
            Self::TransportError(_) => "transport_error",
            Self::Closed { .. } => "closed",
        }
    }
}

/// Normal closure.
pub const CLOSE_NORMAL: u16 = 1000;
/// Closed without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// A `FeedEvent` with the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEnvelope {
    pub connection: ConnectionId,
    pub event: FeedEvent,
}

impl FeedEnvelope {
    pub fn new(connection: ConnectionId, event: FeedEvent) -> Self {
        Self { connection, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_closed_is_normal() {
        let event = FeedEvent::client_closed();
        assert!(event.is_closed());
        assert!(matches!(event, FeedEvent::Closed { code: 1000, .. }));
    }

    #[test]
    fn test_connection_ids_order() {
        assert!(ConnectionId(2) > ConnectionId(1));
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(FeedEvent::Opened.kind(), "opened");
        assert_eq!(FeedEvent::Message("{}".into()).kind(), "message");
        assert_eq!(FeedEvent::TransportError("x".into()).kind(), "transport_error");
    }
}
