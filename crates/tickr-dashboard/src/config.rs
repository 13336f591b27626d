//! Display configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Board display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How long a price card stays highlighted after a move.
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
    /// Redraw interval of the terminal board in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Board title.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_pulse_ms() -> u64 {
    500
}

fn default_frame_interval_ms() -> u64 {
    100
}

fn default_title() -> String {
    "Live Crypto Prices".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pulse_ms: default_pulse_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            title: default_title(),
        }
    }
}

impl DisplayConfig {
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    /// Redraw interval, never below 10ms.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(10))
    }
}
