//! Ports the transaction core needs from the outside world.
//!
//! Consumer-owned interfaces: the core defines the contract, adapters
//! elsewhere satisfy it. Lookups return immutable snapshot DTOs, never
//! references into another subsystem's live state.

mod catalog;
mod device;
mod sink;

pub use catalog::{CatalogResolver, InMemoryCatalogResolver, SkuSnapshot};
pub use device::{DeviceResolver, DeviceSnapshot, InMemoryDeviceResolver};
pub use sink::{EventSink, InMemoryEventSink, SinkError};

use thiserror::Error;

/// Error surfaced by resolver implementations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The backing subsystem could not be reached.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}
