//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Custody Ledger service.
//!
//! The store contract is deliberately small: single-key reads and writes plus
//! an ordered prefix scan. It offers no transactions. The service plans all
//! writes of an operation up front and hands them to
//! [`KeyValueStore::apply_batch`] in one call.

use chrono::{DateTime, Utc};

use crate::domain::errors::{BatchWriteError, KVStoreError};

/// Ordered `(key, value)` pairs returned by a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value storage.
///
/// Development: `InMemoryKVStore`
/// Durable: `FileBackedKVStore` (feature `file-store`)
///
/// Implementations use interior mutability so that a store can be shared
/// between the repository and the history index through an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair, overwriting any existing value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Apply a write plan.
    ///
    /// The default applies operations one by one and stops at the first
    /// failure, reporting how many landed. It is NOT atomic. Adapters that
    /// can apply a batch all-or-nothing override this.
    fn apply_batch(&self, operations: Vec<WriteOp>) -> Result<(), BatchWriteError> {
        for (applied, op) in operations.into_iter().enumerate() {
            let result = match op {
                WriteOp::Put { key, value } => self.put(&key, &value),
                WriteOp::Delete { key } => self.delete(&key),
            };
            result.map_err(|source| BatchWriteError { applied, source })?;
        }
        Ok(())
    }
}

/// A single planned write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl WriteOp {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        WriteOp::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        WriteOp::Delete { key: key.into() }
    }

    /// Key targeted by this operation.
    pub fn key(&self) -> &[u8] {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}
