//! UI surface abstraction.
//!
//! The renderer and filter only speak to this trait. A surface owns its
//! elements; callers refer to cards through the `UiHandle` it returned.

use std::time::Duration;
use tickr_core::{Direction, Instrument, UiHandle};

/// Text slot on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Symbol,
    Price,
    Updated,
}

/// Full-board message shown instead of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Loading,
    Empty,
    Error,
}

impl Placeholder {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Loading => "Loading initial prices...",
            Self::Empty => "No matching cryptocurrencies found.",
            Self::Error => {
                "Could not load initial prices. Please check connection or try again later."
            }
        }
    }
}

/// Colouring of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTone {
    Info,
    Live,
    Warning,
    Error,
}

#[cfg_attr(test, mockall::automock)]
pub trait UiSurface {
    /// Create an empty card for `instrument` and return its handle.
    fn create_card(&mut self, instrument: &Instrument) -> UiHandle;

    fn set_text(&mut self, handle: UiHandle, field: CardField, text: &str);

    fn set_visible(&mut self, handle: UiHandle, visible: bool);

    /// Emphasise the card's price for `duration`. The surface reverts the
    /// emphasis on its own.
    fn pulse(&mut self, handle: UiHandle, direction: Direction, duration: Duration);

    /// Remove every card and placeholder.
    fn clear_surface(&mut self);

    fn show_placeholder(&mut self, placeholder: Placeholder, text: &str);

    fn set_status(&mut self, text: &str, tone: StatusTone);
}
