//! Board renderer.
//!
//! Translates view model contents into surface instructions. A full render
//! rebuilds every card; a price update touches only the affected card's
//! price and timestamp.

use crate::format::{format_usd, updated_text, WAITING_TEXT};
use crate::surface::{CardField, Placeholder, StatusTone, UiSurface};
use std::time::Duration;
use tickr_core::{Direction, PriceRecord, UiHandle};
use tickr_feed::ViewModel;
use tracing::{debug, trace};

pub struct Renderer<S: UiSurface> {
    surface: S,
    pulse: Duration,
}

impl<S: UiSurface> Renderer<S> {
    pub fn new(surface: S, pulse: Duration) -> Self {
        Self { surface, pulse }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Rebuild the board from the view model and bind each card back to
    /// its record.
    ///
    /// An empty model shows the "no matches" placeholder.
    pub fn render_all(&mut self, view_model: &mut ViewModel) {
        self.surface.clear_surface();

        if view_model.is_empty() {
            let placeholder = Placeholder::Empty;
            self.surface.show_placeholder(placeholder, placeholder.text());
            debug!("Rendered empty board");
            return;
        }

        let mut bindings = Vec::with_capacity(view_model.len());
        for record in view_model.all() {
            let handle = self.render_card(record);
            bindings.push((record.id().clone(), handle));
        }

        for (id, handle) in &bindings {
            view_model.bind_ui_handle(id, *handle);
        }

        debug!(cards = bindings.len(), "Rendered board");
    }

    fn render_card(&mut self, record: &PriceRecord) -> UiHandle {
        let handle = self.surface.create_card(&record.instrument);
        self.surface
            .set_text(handle, CardField::Name, &record.instrument.display_name);
        self.surface
            .set_text(handle, CardField::Symbol, record.id().as_str());
        self.surface
            .set_text(handle, CardField::Price, &format_usd(record.current_price));
        let updated = match record.last_updated {
            Some(at) => updated_text(at),
            None => WAITING_TEXT.to_string(),
        };
        self.surface.set_text(handle, CardField::Updated, &updated);
        handle
    }

    /// Refresh one card after an accepted price update.
    ///
    /// Records that were never rendered are skipped.
    pub fn render_update(&mut self, record: &PriceRecord, direction: Direction) {
        let Some(handle) = record.ui_handle else {
            trace!(id = %record.id(), "No card bound, skipping update");
            return;
        };

        self.surface
            .set_text(handle, CardField::Price, &format_usd(record.current_price));
        if let Some(at) = record.last_updated {
            self.surface
                .set_text(handle, CardField::Updated, &updated_text(at));
        }

        if direction.is_move() {
            self.surface.pulse(handle, direction, self.pulse);
        }
    }

    /// Replace the board with the loading placeholder.
    pub fn render_loading(&mut self) {
        self.render_placeholder(Placeholder::Loading);
    }

    /// Replace the board with the blocking error placeholder.
    pub fn render_error(&mut self) {
        self.render_placeholder(Placeholder::Error);
    }

    fn render_placeholder(&mut self, placeholder: Placeholder) {
        self.surface.clear_surface();
        self.surface.show_placeholder(placeholder, placeholder.text());
    }

    pub fn render_status(&mut self, text: &str, tone: StatusTone) {
        self.surface.set_status(text, tone);
    }
}
