//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tickr_dashboard::DisplayConfig;
use tickr_registry::{InstrumentSpec, DEFAULT_SNAPSHOT_URL};
use tickr_ws::BackoffPolicy;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TICKR_CONFIG";

/// Config file used when neither `--config` nor `TICKR_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file was found at this path; built-in defaults are used.
    Defaults(PathBuf),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Request/response endpoint returning the full market snapshot.
    #[serde(default = "default_snapshot_url")]
    pub snapshot_url: String,
    /// Streaming endpoint base URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Tracked instruments, in display order.
    #[serde(default = "InstrumentSpec::defaults")]
    pub instruments: Vec<InstrumentSpec>,
    /// Snapshot request timeout (ms). 0 disables the timeout.
    #[serde(default)]
    pub snapshot_timeout_ms: u64,
    /// WebSocket configuration.
    #[serde(default)]
    pub websocket: WsConfig,
    /// Board display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_snapshot_url() -> String {
    DEFAULT_SNAPSHOT_URL.to_string()
}

fn default_ws_url() -> String {
    "wss://stream.binance.com:9443/ws".to_string()
}

/// WebSocket reconnect configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsConfig {
    /// Reconnect after the provider closes the stream.
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnection backoff (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound of the backoff delay before jitter (ms).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_reconnect() -> bool {
    true
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60000
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            reconnect: default_reconnect(),
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

impl WsConfig {
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.reconnect_base_delay_ms,
            self.reconnect_max_delay_ms,
            self.max_reconnect_attempts,
        )
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter directives. `RUST_LOG` takes precedence.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Log file used while the full-screen board owns the terminal.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("tickr.log")
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_file: default_log_file(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_url: default_snapshot_url(),
            ws_url: default_ws_url(),
            instruments: InstrumentSpec::defaults(),
            snapshot_timeout_ms: 0,
            websocket: WsConfig::default(),
            display: DisplayConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the configuration.
    ///
    /// Precedence: `cli_path` > `TICKR_CONFIG` > `config/default.toml` >
    /// built-in defaults. An explicitly given file must exist; a missing
    /// default file falls back to built-in defaults.
    pub fn resolve(cli_path: Option<&str>) -> AppResult<(Self, ConfigSource)> {
        let explicit = cli_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        match explicit {
            Some(path) => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigSource::File(PathBuf::from(path))))
            }
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> AppResult<(Self, ConfigSource)> {
        let path = path.as_ref();
        if path.exists() {
            let config = Self::from_file(path)?;
            Ok((config, ConfigSource::File(path.to_path_buf())))
        } else {
            Ok((Self::default(), ConfigSource::Defaults(path.to_path_buf())))
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> AppResult<()> {
        if self.snapshot_url.trim().is_empty() {
            return Err(AppError::Config("snapshot_url is empty".to_string()));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(AppError::Config(format!(
                "ws_url must be a ws:// or wss:// URL: {}",
                self.ws_url
            )));
        }
        if self.websocket.reconnect_base_delay_ms > self.websocket.reconnect_max_delay_ms {
            return Err(AppError::Config(
                "websocket.reconnect_base_delay_ms exceeds reconnect_max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Snapshot request timeout, if any.
    pub fn snapshot_timeout(&self) -> Option<Duration> {
        (self.snapshot_timeout_ms > 0).then(|| Duration::from_millis(self.snapshot_timeout_ms))
    }
}
