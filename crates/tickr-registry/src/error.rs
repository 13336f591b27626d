//! Registry and snapshot error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(#[from] tickr_core::CoreError),

    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Snapshot fetch failure.
///
/// `Empty` is the only recoverable variant: the request worked but none of
/// the tracked instruments were in the response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode snapshot response: {0}")]
    Decode(String),

    #[error("Snapshot contained none of the tracked instruments")]
    Empty,

    #[error("Unparsable price for {symbol}: {value:?}")]
    ParseFailure { symbol: String, value: String },
}

impl FetchError {
    /// Whether the caller can display this as "no matches" rather than a
    /// blocking error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Empty => "empty",
            Self::ParseFailure { .. } => "parse_failure",
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
