//! Live feed dispatch and price view model for tickr.
//!
//! - `MiniTickerParser`: turns provider payloads into `PriceTick`s.
//! - `FeedDispatcher`: the single entry point for connection events; tracks
//!   connection state and filters ticks to tracked instruments.
//! - `ViewModel`: ordered store of the latest price per tracked instrument.

pub mod dispatch;
pub mod error;
pub mod parser;
pub mod view_model;

pub use dispatch::{DiscardReason, DispatchStats, FeedDispatcher, FeedOutcome};
pub use error::{FeedError, FeedResult};
pub use parser::{MiniTickerParser, ParseStats};
pub use view_model::ViewModel;
