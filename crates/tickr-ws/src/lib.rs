//! Streaming price feed connection for tickr.
//!
//! Provides the transport half of the live feed:
//! - One multiplexed stream subscription per connection
//! - Typed connection events tagged with the connection that produced them
//! - Connection state machine (Connecting / Open / Error / Closed)
//! - Exponential backoff policy for the caller's reconnect scheduling
//!
//! There is no reconnect loop in here. A closed connection stays closed; the
//! session decides whether to open a new one.

pub mod connection;
pub mod error;
pub mod message;
pub mod reconnect;
pub mod state;
pub mod subscription;

pub use connection::{ConnectionHandle, FeedConnector};
pub use error::{WsError, WsResult};
pub use message::{ConnectionId, FeedEnvelope, FeedEvent};
pub use reconnect::BackoffPolicy;
pub use state::{ConnectionState, ConnectionStateMachine};
pub use subscription::StreamSubscription;

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket or HTTPS connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
