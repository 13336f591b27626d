//! Line-oriented surface.
//!
//! Used when stdout is not a terminal or `--plain` is given. Card changes
//! are collected and written as one line per card on `flush`, so a price
//! update and its pulse end up on the same line.

use crate::error::{DashboardError, DashboardResult};
use crate::surface::{CardField, Placeholder, StatusTone, UiSurface};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tickr_core::{Direction, Instrument, UiHandle};
use tracing::warn;

#[derive(Debug)]
struct PlainCard {
    name: String,
    symbol: String,
    price: String,
    updated: String,
    visible: bool,
    direction: Option<Direction>,
}

pub struct PlainSurface<W: Write> {
    out: W,
    cards: Vec<PlainCard>,
    index: HashMap<UiHandle, usize>,
    dirty: Vec<UiHandle>,
    next_handle: u64,
}

impl<W: Write> PlainSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cards: Vec::new(),
            index: HashMap::new(),
            dirty: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one line per changed, visible card.
    pub fn flush(&mut self) -> DashboardResult<()> {
        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.sort_by_key(|h| self.index.get(h).copied().unwrap_or(usize::MAX));

        for handle in dirty {
            let Some(&idx) = self.index.get(&handle) else {
                continue;
            };
            let card = &mut self.cards[idx];
            let direction = card.direction.take();
            if !card.visible {
                continue;
            }
            let marker = match direction {
                Some(Direction::Up) => '▲',
                Some(Direction::Down) => '▼',
                _ => ' ',
            };
            writeln!(
                self.out,
                "{marker} {:<12} {:<10} {:>18}  {}",
                card.name, card.symbol, card.price, card.updated
            )?;
        }

        self.out.flush()?;
        Ok(())
    }

    fn mark_dirty(&mut self, handle: UiHandle) {
        if !self.dirty.contains(&handle) {
            self.dirty.push(handle);
        }
    }

    fn card_mut(&mut self, handle: UiHandle) -> Option<&mut PlainCard> {
        let idx = *self.index.get(&handle)?;
        self.cards.get_mut(idx)
    }

    fn write_line(&mut self, line: &str) {
        let result = self
            .flush()
            .and_then(|()| writeln!(self.out, "{line}").map_err(DashboardError::from))
            .and_then(|()| self.out.flush().map_err(DashboardError::from));
        if let Err(e) = result {
            warn!(error = %e, "Failed to write to output");
        }
    }
}

impl<W: Write> UiSurface for PlainSurface<W> {
    fn create_card(&mut self, instrument: &Instrument) -> UiHandle {
        let handle = UiHandle(self.next_handle);
        self.next_handle += 1;
        self.index.insert(handle, self.cards.len());
        self.cards.push(PlainCard {
            name: instrument.display_name.clone(),
            symbol: instrument.id.to_string(),
            price: String::new(),
            updated: String::new(),
            visible: true,
            direction: None,
        });
        self.mark_dirty(handle);
        handle
    }

    fn set_text(&mut self, handle: UiHandle, field: CardField, text: &str) {
        let Some(card) = self.card_mut(handle) else {
            return;
        };
        let slot = match field {
            CardField::Name => &mut card.name,
            CardField::Symbol => &mut card.symbol,
            CardField::Price => &mut card.price,
            CardField::Updated => &mut card.updated,
        };
        text.clone_into(slot);
        self.mark_dirty(handle);
    }

    fn set_visible(&mut self, handle: UiHandle, visible: bool) {
        let Some(card) = self.card_mut(handle) else {
            return;
        };
        card.visible = visible;
        if visible {
            self.mark_dirty(handle);
        }
    }

    fn pulse(&mut self, handle: UiHandle, direction: Direction, _duration: Duration) {
        if let Some(card) = self.card_mut(handle) {
            card.direction = Some(direction);
            self.mark_dirty(handle);
        }
    }

    fn clear_surface(&mut self) {
        self.cards.clear();
        self.index.clear();
        self.dirty.clear();
    }

    fn show_placeholder(&mut self, _placeholder: Placeholder, text: &str) {
        self.write_line(text);
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        let label = match tone {
            StatusTone::Info => "info",
            StatusTone::Live => "live",
            StatusTone::Warning => "warn",
            StatusTone::Error => "error",
        };
        self.write_line(&format!("[{label}] {text}"));
    }
}

impl<W: Write> std::fmt::Debug for PlainSurface<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainSurface")
            .field("cards", &self.cards.len())
            .field("dirty", &self.dirty.len())
            .finish()
    }
}
