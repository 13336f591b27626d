//! Price state types.
//!
//! Contains the per-instrument price record kept by the view model and the
//! small value types that describe a price update.

use crate::{Instrument, InstrumentId, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a rendered card.
///
/// Minted by the UI surface; the core only stores and hands it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UiHandle(pub u64);

impl UiHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Direction of a price update relative to the prior price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    /// Whether this direction gets a visual emphasis.
    pub fn is_move(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying a price to the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The instrument is not tracked; nothing changed.
    Ignored,
    /// The price was stored.
    Applied(Direction),
}

impl UpdateResult {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Ignored => None,
            Self::Applied(direction) => Some(*direction),
        }
    }
}

/// Latest price for one instrument as extracted from a feed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTick {
    pub id: InstrumentId,
    pub price: Price,
    /// Provider event time in milliseconds, when present.
    pub event_time_ms: Option<i64>,
}

impl PriceTick {
    pub fn new(id: InstrumentId, price: Price) -> Self {
        Self {
            id,
            price,
            event_time_ms: None,
        }
    }
}

/// Last-known price state of one tracked instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    pub instrument: Instrument,
    pub current_price: Price,
    pub previous_price: Option<Price>,
    pub ui_handle: Option<UiHandle>,
    /// Time of the last accepted feed update (None until the first one).
    pub last_updated: Option<DateTime<Utc>>,
}

impl PriceRecord {
    /// Create a record seeded from a snapshot price.
    pub fn new(instrument: Instrument, price: Price) -> Self {
        Self {
            instrument,
            current_price: price,
            previous_price: None,
            ui_handle: None,
            last_updated: None,
        }
    }

    pub fn id(&self) -> &InstrumentId {
        &self.instrument.id
    }

    /// Store a new price and classify it against the current one.
    pub fn apply_price(&mut self, price: Price, at: DateTime<Utc>) -> Direction {
        let direction = price.direction_from(self.current_price);
        self.previous_price = Some(self.current_price);
        self.current_price = price;
        self.last_updated = Some(at);
        direction
    }
}
