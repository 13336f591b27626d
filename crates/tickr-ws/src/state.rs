//! Connection state machine.
//!
//! ```text
//! Connecting --Opened--------> Open
//! Connecting --TransportError-> Error
//! Open -------TransportError-> Error
//! (any) ------Closed---------> Closed   (terminal)
//! ```
//!
//! A transport error does not close the connection; the provider follows up
//! with its own close. Each state is reported once.

use crate::message::FeedEvent;
use std::fmt;
use tracing::debug;

/// Connection state surfaced to the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Open,
    Error,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Error => "error",
            Self::Closed => "closed",
        }
    }

    /// Numeric form for the state gauge.
    pub fn as_gauge(&self) -> i64 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Error => 2,
            Self::Closed => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of one connection.
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateMachine {
    /// New machine in `Connecting`.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply an event. Returns the new state if it changed.
    pub fn apply(&mut self, event: &FeedEvent) -> Option<ConnectionState> {
        let next = match (self.state, event) {
            (ConnectionState::Closed, _) => None,
            (_, FeedEvent::Closed { .. }) => Some(ConnectionState::Closed),
            (ConnectionState::Connecting, FeedEvent::Opened) => Some(ConnectionState::Open),
            (ConnectionState::Connecting | ConnectionState::Open, FeedEvent::TransportError(_)) => {
                Some(ConnectionState::Error)
            }
            _ => None,
        };

        next.map(|state| self.transition(state))
    }

    /// Explicit local close.
    pub fn close(&mut self) -> Option<ConnectionState> {
        if self.state.is_terminal() {
            return None;
        }
        Some(self.transition(ConnectionState::Closed))
    }

    fn transition(&mut self, next: ConnectionState) -> ConnectionState {
        debug!(from = %self.state, to = %next, "Connection state transition");
        self.state = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed() -> FeedEvent {
        FeedEvent::Closed {
            code: 1006,
            reason: String::new(),
        }
    }

    #[test]
    fn test_open_then_close() {
        let mut sm = ConnectionStateMachine::new();
        assert_eq!(sm.state(), ConnectionState::Connecting);
        assert_eq!(sm.apply(&FeedEvent::Opened), Some(ConnectionState::Open));
        assert_eq!(sm.apply(&closed()), Some(ConnectionState::Closed));
    }

    #[test]
    fn test_messages_do_not_change_state() {
        let mut sm = ConnectionStateMachine::new();
        sm.apply(&FeedEvent::Opened);
        assert_eq!(sm.apply(&FeedEvent::Message("{}".into())), None);
        assert_eq!(sm.state(), ConnectionState::Open);
    }

    #[test]
    fn test_error_keeps_connection_until_close() {
        let mut sm = ConnectionStateMachine::new();
        sm.apply(&FeedEvent::Opened);
        assert_eq!(
            sm.apply(&FeedEvent::TransportError("reset".into())),
            Some(ConnectionState::Error)
        );
        // Repeated error is not reported again
        assert_eq!(sm.apply(&FeedEvent::TransportError("reset".into())), None);
        assert_eq!(sm.apply(&closed()), Some(ConnectionState::Closed));
    }

    #[test]
    fn test_error_before_open() {
        let mut sm = ConnectionStateMachine::new();
        assert_eq!(
            sm.apply(&FeedEvent::TransportError("refused".into())),
            Some(ConnectionState::Error)
        );
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut sm = ConnectionStateMachine::new();
        sm.apply(&closed());
        assert_eq!(sm.apply(&FeedEvent::Opened), None);
        assert_eq!(sm.apply(&FeedEvent::TransportError("late".into())), None);
        assert_eq!(sm.apply(&closed()), None);
        assert_eq!(sm.close(), None);
        assert_eq!(sm.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_explicit_close() {
        let mut sm = ConnectionStateMachine::new();
        sm.apply(&FeedEvent::Opened);
        assert_eq!(sm.close(), Some(ConnectionState::Closed));
        assert_eq!(sm.close(), None);
    }
}
