//! Prometheus metrics and structured logging for tickr.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus metrics for feed state, price updates and snapshot loads

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogTarget};
pub use metrics::Metrics;
