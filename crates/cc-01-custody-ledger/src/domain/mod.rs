//! # Domain Layer
//!
//! Pure domain logic for the Custody Ledger subsystem.
//!
//! ## Modules
//!
//! - `entities` - Agents and material lots
//! - `events` - History event records and topic schemas
//! - `keys` - Entity keys and composite history keys
//! - `clock` - Sortable, strictly increasing event timestamps
//! - `config` - Input limits
//! - `errors` - Domain error types

pub mod clock;
pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod keys;

pub use clock::{format_timestamp, MonotonicClock};
pub use config::LedgerConfig;
pub use entities::{AgentKind, AgentRecord, EntityKind, Holdings, MaterialLot, Quantity};
pub use errors::{
    BatchWriteError, KVStoreError, LedgerError, LedgerErrorKind, LedgerErrorPayload,
};
pub use events::{CollectionEvent, HistoryRecord, HistoryTopic, ProcessingEvent, TransferEvent};
