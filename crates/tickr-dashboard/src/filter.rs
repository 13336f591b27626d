//! Card filtering.
//!
//! Filtering only toggles visibility. Records and cards are never created
//! or removed here.

use crate::surface::UiSurface;
use tickr_core::PriceRecord;
use tickr_feed::ViewModel;
use tracing::debug;

/// Remembers the active query so it can be re-applied after a re-render.
#[derive(Debug, Default, Clone)]
pub struct FilterController {
    query: String,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active query as entered.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set a new query and apply it. Returns the number of visible cards.
    pub fn apply_filter<S: UiSurface>(
        &mut self,
        view_model: &ViewModel,
        surface: &mut S,
        query: &str,
    ) -> usize {
        self.query = query.to_string();
        self.reapply(view_model, surface)
    }

    /// Apply the active query again.
    pub fn reapply<S: UiSurface>(&self, view_model: &ViewModel, surface: &mut S) -> usize {
        let needle = normalize(&self.query);
        let mut visible = 0;

        for record in view_model.all() {
            let Some(handle) = record.ui_handle else {
                continue;
            };
            let show = matches(record, &needle);
            surface.set_visible(handle, show);
            if show {
                visible += 1;
            }
        }

        debug!(query = %self.query, visible, "Filter applied");
        visible
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring match on symbol or display name.
///
/// `needle` must already be normalized. An empty needle matches everything.
fn matches(record: &PriceRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.id().as_str().to_lowercase().contains(needle)
        || record.instrument.display_name.to_lowercase().contains(needle)
}
