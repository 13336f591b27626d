//! Instrument identification types.
//!
//! An instrument is a tracked tradable pair (e.g. BTCUSDT). Providers are not
//! consistent about symbol case (the stream path uses "btcusdt", payloads use
//! "BTCUSDT"), so ids are normalized to upper case on construction.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized instrument identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Create an id from a provider symbol.
    ///
    /// Rejects empty symbols and symbols containing whitespace or '/'.
    pub fn new(symbol: impl AsRef<str>) -> Result<Self> {
        let symbol = symbol.as_ref().trim();
        if symbol.is_empty()
            || symbol
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c == '@')
        {
            return Err(CoreError::InvalidInstrument(symbol.to_string()));
        }
        Ok(Self(symbol.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used in stream names.
    pub fn to_stream_name(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for InstrumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A tracked instrument with its display name.
///
/// Immutable once built by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub display_name: String,
}

impl Instrument {
    pub fn new(id: InstrumentId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}
