//! # Custody Ledger Service
//!
//! The operations engine implementing `CustodyLedgerApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates every argument and every referenced record before writing
//! 2. Builds a write plan (entity updates plus one history event)
//! 3. Hands the plan to `KeyValueStore::apply_batch` in one call
//! 4. Serializes all mutations behind a single operation lock
//!
//! Reads do not take the operation lock; the store adapters guard their own
//! state.

mod helpers;
mod ledger;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::clock::MonotonicClock;
use crate::domain::config::LedgerConfig;
use crate::history::HistoryIndex;
use crate::ports::outbound::{KeyValueStore, TimeSource};
use crate::repository::EntityRepository;

/// The Custody Ledger Service.
pub struct CustodyLedgerService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Shared store, also held by `entities` and `history`.
    pub(crate) store: Arc<KV>,
    /// Agent and lot records.
    pub(crate) entities: EntityRepository<KV>,
    /// Composite-key event index.
    pub(crate) history: HistoryIndex<KV>,
    /// Time source for event timestamps.
    pub(crate) time_source: TS,
    /// Input limits.
    pub(crate) config: LedgerConfig,
    /// Operation lock. Guards the clock so that timestamps follow commit order.
    pub(crate) op_lock: Mutex<MonotonicClock>,
}

/// Dependencies for CustodyLedgerService
pub struct CustodyLedgerDependencies<KV, TS> {
    pub kv_store: Arc<KV>,
    pub time_source: TS,
}

impl<KV, TS> CustodyLedgerService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Create a new Custody Ledger Service with the given dependencies.
    pub fn new(deps: CustodyLedgerDependencies<KV, TS>, config: LedgerConfig) -> Self {
        let store = deps.kv_store;
        Self {
            entities: EntityRepository::new(Arc::clone(&store)),
            history: HistoryIndex::new(Arc::clone(&store)),
            store,
            time_source: deps.time_source,
            config,
            op_lock: Mutex::new(MonotonicClock::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<KV> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}
