//! Core domain types for the tickr price board.
//!
//! This crate provides the types shared by every other crate:
//! - `InstrumentId`, `Instrument`: tracked tradable symbols
//! - `Price`: precision-safe decimal price
//! - `PriceRecord`: last-known price state of one instrument
//! - `Direction`, `UpdateResult`: classification of a price update
//! - `UiHandle`: opaque reference to a rendered card

pub mod decimal;
pub mod error;
pub mod instrument;
pub mod types;

pub use decimal::Price;
pub use error::{CoreError, Result};
pub use instrument::{Instrument, InstrumentId};
pub use types::{Direction, PriceRecord, PriceTick, UiHandle, UpdateResult};
