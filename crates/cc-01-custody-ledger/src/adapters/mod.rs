//! # Adapters Module
//!
//! Contains adapter implementations for the Custody Ledger subsystem.
//!
//! ## Modules
//!
//! - `storage`: `KeyValueStore` implementations (in-memory, file-backed)
//! - `infra`: `TimeSource` implementations

pub mod infra;
pub mod storage;

pub use infra::{FixedTimeSource, SystemTimeSource};
#[cfg(feature = "file-store")]
pub use storage::FileBackedKVStore;
pub use storage::InMemoryKVStore;
