//! # Custody Ledger (cc-01)
//!
//! Chain-of-custody ledger for waste material moving from collection agents
//! to processing agents. Records quantities at every stage and keeps a
//! prefix-queryable audit trail of every collection, transfer and processing
//! event.
//!
//! ## Architecture
//!
//! ```text
//! operation + args ──▶ LedgerDispatcher ──▶ CustodyLedgerService
//!                                               │
//!                          ┌────────────────────┼─────────────────┐
//!                          ▼                    ▼                 ▼
//!                  EntityRepository       HistoryIndex       TimeSource
//!                          └─────────┬──────────┘
//!                                    ▼
//!                              KeyValueStore
//! ```
//!
//! The store offers no transactions. The service validates every argument
//! and every referenced record, then commits one write plan per operation.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Unique Ids | Agent ids unique per kind, lot ids unique |
//! | 2 | Non-negative Quantities | Holdings and lot totals never go below zero |
//! | 3 | Conservation | Transfer moves quantity; only processing reduces it |
//! | 4 | Zero Holdings Removed | A holding reaching zero is dropped from the map |
//! | 5 | Processor Deletion | A processor holding material cannot be deleted |
//! | 6 | One Event Per Mutation | Collect, transfer and process append one event each |
//! | 7 | Append-only History | Event keys are never overwritten or deleted |
//! | 8 | Validate Then Write | A rejected operation performs no writes |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, events, key layout, timestamps, errors
//! - `ports/` - Port traits (inbound API, outbound store and clock)
//! - `adapters/` - In-memory and file-backed stores, time sources
//! - `repository` - Agent and lot record access
//! - `history` - Composite-key event index
//! - `service/` - Operations engine implementing the API
//! - `dispatch/` - Named-operation decoding and responses
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use cc_01_custody_ledger::{
//!     AgentKind, CustodyLedgerApi, CustodyLedgerDependencies, CustodyLedgerService,
//!     InMemoryKVStore, LedgerConfig, SystemTimeSource,
//! };
//!
//! let service = CustodyLedgerService::new(
//!     CustodyLedgerDependencies {
//!         kv_store: Arc::new(InMemoryKVStore::new()),
//!         time_source: SystemTimeSource,
//!     },
//!     LedgerConfig::default(),
//! );
//!
//! service.register_agent(AgentKind::Collector, "R1", "Acme").unwrap();
//! service.collect("L1", "Plastic", "recyclable", 100, "R1").unwrap();
//! assert_eq!(service.query_lot("L1").unwrap().total_quantity, 100);
//! ```

pub mod adapters;
pub mod dispatch;
pub mod domain;
pub mod history;
pub mod ports;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export key types for convenience
pub use adapters::{FixedTimeSource, InMemoryKVStore, SystemTimeSource};
#[cfg(feature = "file-store")]
pub use adapters::FileBackedKVStore;
pub use dispatch::{LedgerCommand, LedgerDispatcher, LedgerResponse};
pub use domain::{
    AgentKind, AgentRecord, CollectionEvent, EntityKind, HistoryTopic, KVStoreError,
    LedgerConfig, LedgerError, LedgerErrorKind, LedgerErrorPayload, MaterialLot,
    ProcessingEvent, Quantity, TransferEvent,
};
pub use history::HistoryIndex;
pub use ports::inbound::CustodyLedgerApi;
pub use ports::outbound::{KeyValueStore, TimeSource, WriteOp};
pub use repository::EntityRepository;
pub use service::{CustodyLedgerDependencies, CustodyLedgerService};
