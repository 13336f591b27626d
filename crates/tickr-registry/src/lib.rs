//! Instrument registry and price snapshot loading for tickr.
//!
//! - `InstrumentRegistry`: the static, ordered set of tracked instruments.
//! - `load_snapshot`: seeds one `PriceRecord` per tracked instrument from a
//!   request/response price provider.
//! - `HttpSnapshotProvider`: the REST binding of that provider.

pub mod client;
pub mod error;
pub mod registry;
pub mod snapshot;

pub use client::{HttpSnapshotProvider, DEFAULT_SNAPSHOT_URL};
pub use error::{FetchError, FetchResult, RegistryError, RegistryResult};
pub use registry::{InstrumentRegistry, InstrumentSpec};
pub use snapshot::{load_snapshot, RawTicker, SnapshotProvider};
