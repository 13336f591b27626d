//! Feed error types.

use thiserror::Error;

/// A single feed payload that could not be turned into price ticks.
///
/// Never fatal: the payload is discarded and the connection continues.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Invalid price for {symbol}: {value:?}")]
    InvalidPrice { symbol: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
