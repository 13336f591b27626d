//! tickr - live crypto price board.
//!
//! Wires the components together:
//! - snapshot of the tracked instruments over HTTP
//! - streaming price feed over WebSocket, with reconnect backoff
//! - board rendering and filtering on a terminal or plain output

pub mod app;
pub mod config;
pub mod error;
pub mod session;

pub use app::{Application, UiMode};
pub use config::{AppConfig, ConfigSource};
pub use error::{AppError, AppResult};
pub use session::{Session, StartOutcome};
