//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] tickr_registry::RegistryError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] tickr_registry::FetchError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tickr_ws::WsError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] tickr_dashboard::DashboardError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tickr_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
