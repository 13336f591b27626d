//! Instrument registry.
//!
//! Static configuration of the tracked instruments. Registry order is the
//! display order of the board and the order of the stream subscription.

use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tickr_core::{Instrument, InstrumentId};
use tracing::debug;

/// Quote suffixes stripped when deriving a display name from a symbol.
const QUOTE_SUFFIXES: [&str; 2] = ["USDT", "BUSD"];

/// Pairs tracked when no instrument list is configured.
const DEFAULT_INSTRUMENTS: [(&str, &str); 12] = [
    ("BTCUSDT", "Bitcoin"),
    ("ETHUSDT", "Ethereum"),
    ("BNBBUSD", "BNB"),
    ("SOLUSDT", "Solana"),
    ("ADAUSDT", "Cardano"),
    ("XRPUSDT", "XRP"),
    ("DOGEUSDT", "Dogecoin"),
    ("DOTUSDT", "Polkadot"),
    ("MATICUSDT", "Polygon"),
    ("SHIBUSDT", "Shiba Inu"),
    ("AVAXUSDT", "Avalanche"),
    ("TRXUSDT", "TRON"),
];

/// Instrument entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Provider symbol (e.g. "BTCUSDT").
    pub id: String,
    /// Display name. Derived from the symbol if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InstrumentSpec {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
        }
    }

    /// The built-in instrument list.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_INSTRUMENTS
            .iter()
            .map(|(id, name)| Self::new(*id, Some(name)))
            .collect()
    }
}

/// Ordered, duplicate-free set of tracked instruments.
#[derive(Debug, Clone)]
pub struct InstrumentRegistry {
    instruments: Vec<Instrument>,
    positions: HashMap<InstrumentId, usize>,
}

impl InstrumentRegistry {
    /// Build a registry from configured entries, preserving their order.
    pub fn new(specs: &[InstrumentSpec]) -> RegistryResult<Self> {
        let mut instruments = Vec::with_capacity(specs.len());
        let mut positions = HashMap::with_capacity(specs.len());

        for spec in specs {
            let id = InstrumentId::new(&spec.id)?;
            if positions.contains_key(&id) {
                return Err(RegistryError::DuplicateInstrument(id.to_string()));
            }

            let display_name = match spec.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => derive_display_name(&id),
            };

            positions.insert(id.clone(), instruments.len());
            instruments.push(Instrument::new(id, display_name));
        }

        debug!(count = instruments.len(), "Instrument registry built");

        Ok(Self {
            instruments,
            positions,
        })
    }

    /// Instruments in registry order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn ids(&self) -> impl Iterator<Item = &InstrumentId> {
        self.instruments.iter().map(|i| &i.id)
    }

    pub fn get(&self, id: &InstrumentId) -> Option<&Instrument> {
        self.positions.get(id).map(|&idx| &self.instruments[idx])
    }

    pub fn contains(&self, id: &InstrumentId) -> bool {
        self.positions.contains_key(id)
    }

    /// Registry position of an instrument.
    pub fn position(&self, id: &InstrumentId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        let instruments: Vec<Instrument> = DEFAULT_INSTRUMENTS
            .iter()
            .filter_map(|(id, name)| {
                InstrumentId::new(id)
                    .ok()
                    .map(|id| Instrument::new(id, *name))
            })
            .collect();
        let positions = instruments
            .iter()
            .enumerate()
            .map(|(idx, i)| (i.id.clone(), idx))
            .collect();
        Self {
            instruments,
            positions,
        }
    }
}

/// Derive a display name by stripping the quote currency ("DOGEUSDT" -> "DOGE").
fn derive_display_name(id: &InstrumentId) -> String {
    let symbol = id.as_str();
    QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| symbol.strip_suffix(suffix))
        .filter(|base| !base.is_empty())
        .unwrap_or(symbol)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> InstrumentId {
        InstrumentId::new(s).unwrap()
    }

    #[test]
    fn test_default_registry_order() {
        let registry = InstrumentRegistry::default();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.instruments()[0].id, id("BTCUSDT"));
        assert_eq!(registry.instruments()[9].display_name, "Shiba Inu");
        assert_eq!(registry.position(&id("TRXUSDT")), Some(11));
    }

    #[test]
    fn test_defaults_match_default_registry() {
        let built = InstrumentRegistry::new(&InstrumentSpec::defaults()).unwrap();
        let default = InstrumentRegistry::default();
        assert_eq!(built.instruments(), default.instruments());
    }

    #[test]
    fn test_display_name_derived_from_symbol() {
        let registry = InstrumentRegistry::new(&[
            InstrumentSpec::new("pepeusdt", None),
            InstrumentSpec::new("FDUSDBUSD", Some("  ")),
            InstrumentSpec::new("USDT", None),
            InstrumentSpec::new("ETHBTC", None),
        ])
        .unwrap();

        let names: Vec<&str> = registry
            .instruments()
            .iter()
            .map(|i| i.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["PEPE", "FDUSD", "USDT", "ETHBTC"]);
    }

    #[test]
    fn test_duplicate_rejected_case_insensitive() {
        let result = InstrumentRegistry::new(&[
            InstrumentSpec::new("BTCUSDT", None),
            InstrumentSpec::new("btcusdt", None),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateInstrument(s)) if s == "BTCUSDT"));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let result = InstrumentRegistry::new(&[InstrumentSpec::new("", None)]);
        assert!(matches!(result, Err(RegistryError::InvalidInstrument(_))));
    }

    #[test]
    fn test_lookup() {
        let registry = InstrumentRegistry::default();
        assert!(registry.contains(&id("solusdt")));
        assert!(!registry.contains(&id("FOOUSDT")));
        assert_eq!(registry.get(&id("ADAUSDT")).unwrap().display_name, "Cardano");
    }

    #[test]
    fn test_empty_registry_allowed() {
        let registry = InstrumentRegistry::new(&[]).unwrap();
        assert!(registry.is_empty());
    }
}
