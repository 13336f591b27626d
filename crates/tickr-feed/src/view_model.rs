//! Price view model.
//!
//! Ordered store of the last-known price per tracked instrument. Order is
//! fixed at `initialize` and matches the registry. Single writer: the
//! session owns the model and mutates it from one task, so there is no
//! locking.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tickr_core::{InstrumentId, Price, PriceRecord, UiHandle, UpdateResult};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct ViewModel {
    records: Vec<PriceRecord>,
    index: HashMap<InstrumentId, usize>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content with `records`, keeping their order.
    ///
    /// Repeated ids keep the first record. Returns the number of records
    /// stored.
    pub fn initialize(&mut self, records: Vec<PriceRecord>) -> usize {
        self.records.clear();
        self.index.clear();

        for record in records {
            if self.index.contains_key(record.id()) {
                warn!(id = %record.id(), "Duplicate record ignored");
                continue;
            }
            self.index.insert(record.id().clone(), self.records.len());
            self.records.push(record);
        }

        debug!(records = self.records.len(), "View model initialized");
        self.records.len()
    }

    /// Apply a new price, stamped with the current time.
    pub fn apply_update(&mut self, id: &InstrumentId, price: Price) -> UpdateResult {
        self.apply_update_at(id, price, Utc::now())
    }

    /// Apply a new price observed at `at`.
    ///
    /// Unknown ids are ignored. Otherwise the current price becomes the
    /// previous one and the direction is judged against it.
    pub fn apply_update_at(
        &mut self,
        id: &InstrumentId,
        price: Price,
        at: DateTime<Utc>,
    ) -> UpdateResult {
        let Some(&idx) = self.index.get(id) else {
            return UpdateResult::Ignored;
        };

        let direction = self.records[idx].apply_price(price, at);
        UpdateResult::Applied(direction)
    }

    /// Attach the rendered card to a record. Returns false for unknown ids.
    pub fn bind_ui_handle(&mut self, id: &InstrumentId, handle: UiHandle) -> bool {
        match self.index.get(id) {
            Some(&idx) => {
                self.records[idx].ui_handle = Some(handle);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &InstrumentId) -> Option<&PriceRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    /// All records in display order.
    pub fn all(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
