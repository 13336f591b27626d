//! Surface that records what the board would show.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;
use tickr_core::{Direction, Instrument, UiHandle};
use tickr_dashboard::{CardField, Placeholder, StatusTone, UiSurface};

#[derive(Debug, Clone, Default)]
pub struct RecordedCard {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub updated: String,
    pub visible: bool,
    pub pulses: Vec<Direction>,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    cards: Vec<(UiHandle, RecordedCard)>,
    index: HashMap<UiHandle, usize>,
    next_handle: u64,
    pub placeholders: Vec<Placeholder>,
    pub statuses: Vec<(String, StatusTone)>,
    pub created: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card showing `symbol`, if rendered.
    pub fn card(&self, symbol: &str) -> Option<&RecordedCard> {
        self.cards
            .iter()
            .map(|(_, card)| card)
            .find(|card| card.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.cards.iter().map(|(_, c)| c.symbol.as_str()).collect()
    }

    pub fn visible_symbols(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|(_, c)| c.visible)
            .map(|(_, c)| c.symbol.as_str())
            .collect()
    }

    pub fn last_status(&self) -> Option<(&str, StatusTone)> {
        self.statuses.last().map(|(text, tone)| (text.as_str(), *tone))
    }

    pub fn last_placeholder(&self) -> Option<Placeholder> {
        self.placeholders.last().copied()
    }

    fn card_mut(&mut self, handle: UiHandle) -> Option<&mut RecordedCard> {
        let idx = *self.index.get(&handle)?;
        self.cards.get_mut(idx).map(|(_, card)| card)
    }
}

impl UiSurface for RecordingSurface {
    fn create_card(&mut self, instrument: &Instrument) -> UiHandle {
        self.next_handle += 1;
        self.created += 1;
        let handle = UiHandle(self.next_handle);
        self.index.insert(handle, self.cards.len());
        self.cards.push((
            handle,
            RecordedCard {
                symbol: instrument.id.to_string(),
                visible: true,
                ..Default::default()
            },
        ));
        handle
    }

    fn set_text(&mut self, handle: UiHandle, field: CardField, text: &str) {
        if let Some(card) = self.card_mut(handle) {
            let slot = match field {
                CardField::Name => &mut card.name,
                CardField::Symbol => &mut card.symbol,
                CardField::Price => &mut card.price,
                CardField::Updated => &mut card.updated,
            };
            *slot = text.to_string();
        }
    }

    fn set_visible(&mut self, handle: UiHandle, visible: bool) {
        if let Some(card) = self.card_mut(handle) {
            card.visible = visible;
        }
    }

    fn pulse(&mut self, handle: UiHandle, direction: Direction, _duration: Duration) {
        if let Some(card) = self.card_mut(handle) {
            card.pulses.push(direction);
        }
    }

    fn clear_surface(&mut self) {
        self.cards.clear();
        self.index.clear();
    }

    fn show_placeholder(&mut self, placeholder: Placeholder, _text: &str) {
        self.placeholders.push(placeholder);
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.statuses.push((text.to_string(), tone));
    }
}
