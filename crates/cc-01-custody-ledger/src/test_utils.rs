//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::adapters::{FixedTimeSource, InMemoryKVStore};
use crate::domain::config::LedgerConfig;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{KeyValueStore, ScanResult};
use crate::service::{CustodyLedgerDependencies, CustodyLedgerService};

pub const T0_SECS: i64 = 1_700_000_000;

pub fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(T0_SECS, 0).unwrap()
}

/// Service over an in-memory store with a frozen clock.
pub fn make_test_service() -> CustodyLedgerService<InMemoryKVStore, FixedTimeSource> {
    make_service_over(Arc::new(InMemoryKVStore::new()))
}

pub fn make_service_over<KV: KeyValueStore>(
    store: Arc<KV>,
) -> CustodyLedgerService<KV, FixedTimeSource> {
    CustodyLedgerService::new(
        CustodyLedgerDependencies {
            kv_store: store,
            time_source: FixedTimeSource::new(t0()),
        },
        LedgerConfig::default(),
    )
}

/// Store whose individual writes start failing after a set number succeed.
///
/// Uses the trait's sequential `apply_batch`, so a failing write in the
/// middle of a plan leaves the earlier writes in place.
pub struct FlakyKVStore {
    inner: InMemoryKVStore,
    writes_before_failure: AtomicUsize,
    armed: AtomicBool,
}

impl FlakyKVStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryKVStore::new(),
            writes_before_failure: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Let `n` more writes succeed, then fail every write after them.
    pub fn fail_after(&self, n: usize) {
        self.writes_before_failure.store(n, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryKVStore {
        &self.inner
    }

    fn check_write(&self) -> Result<(), KVStoreError> {
        if !self.armed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let remaining = self.writes_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(KVStoreError::IOError {
                message: "injected write failure".to_string(),
            });
        }
        self.writes_before_failure.store(remaining - 1, Ordering::SeqCst);
        Ok(())
    }
}

impl KeyValueStore for FlakyKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.check_write()?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.check_write()?;
        self.inner.delete(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.inner.prefix_scan(prefix)
    }
}
