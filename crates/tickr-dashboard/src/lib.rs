//! tickr-dashboard - Price board rendering and filtering.
//!
//! The board is driven through the [`UiSurface`] trait:
//!
//! - [`Renderer`] turns view model contents into cards and placeholders
//! - [`FilterController`] toggles card visibility from a search query
//! - [`TerminalSurface`] draws a full-screen board with ratatui
//! - [`PlainSurface`] writes one line per card change to any `Write`
//!
//! # Architecture
//!
//! ```text
//! ViewModel ──► Renderer ──┐
//!                          ├──► UiSurface ──► TerminalSurface (TUI)
//! query ──► FilterController┘              └─► PlainSurface (lines)
//! ```

mod config;
mod error;
mod filter;
mod format;
mod plain;
mod renderer;
mod surface;
mod terminal;

pub use config::DisplayConfig;
pub use error::{DashboardError, DashboardResult};
pub use filter::FilterController;
pub use format::{format_usd, updated_text, WAITING_TEXT};
pub use plain::PlainSurface;
pub use renderer::Renderer;
pub use surface::{CardField, Placeholder, StatusTone, UiSurface};
pub use terminal::{draw_to, InputAction, TerminalGuard, TerminalSurface};
