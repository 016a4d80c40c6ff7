//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod memory;
#[cfg(feature = "file-store")]
mod file;
#[cfg(feature = "file-store")]
mod lock;

pub use memory::InMemoryKVStore;
#[cfg(feature = "file-store")]
pub use file::FileBackedKVStore;
#[cfg(feature = "file-store")]
pub use lock::StoreLock;
