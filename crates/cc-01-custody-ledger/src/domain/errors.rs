//! # Domain Errors
//!
//! Error types for the Custody Ledger subsystem.
//!
//! ## Design Principles
//!
//! - Every failure maps to exactly one `LedgerErrorKind`
//! - Validation errors are raised before any write is planned
//! - Store failures are never swallowed; partial writes carry their progress

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::EntityKind;

/// Errors returned by ledger operations.
///
/// All errors are terminal for the current operation. None are retried
/// internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Missing, empty, or malformed input.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// An entity with this id is already registered.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: EntityKind, id: String },

    /// The referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The agent has no recorded holding for the lot.
    #[error("Agent {agent_id} holds no quantity of lot {lot_id}")]
    NoSuchHolding { agent_id: String, lot_id: String },

    /// The operation would drive a quantity below zero.
    #[error("Insufficient quantity of {lot_id} at {holder}: available {available}, requested {requested}")]
    InsufficientQuantity {
        holder: String,
        lot_id: String,
        available: u64,
        requested: u64,
    },

    /// A processing agent still holds material and cannot be deleted.
    #[error("Processor {processor_id} still holds {lots} lot(s), cannot delete")]
    HasRemainingHoldings { processor_id: String, lots: usize },

    /// History query is malformed for the topic schema.
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// The underlying store failed.
    ///
    /// `applied` of `planned` writes landed before the failure. When
    /// `0 < applied < planned` the ledger is in a partially written state.
    #[error("Storage failure after {applied}/{planned} writes: {message}")]
    StorageFailure {
        message: String,
        applied: usize,
        planned: usize,
    },
}

impl LedgerError {
    /// Shorthand for `InvalidArgument`.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for `InvalidQuery`.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Shorthand for `NotFound`.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Storage failure that happened before any write was applied.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
            applied: 0,
            planned: 0,
        }
    }

    /// The serializable kind of this error.
    pub fn kind(&self) -> LedgerErrorKind {
        match self {
            Self::InvalidArgument { .. } => LedgerErrorKind::InvalidArgument,
            Self::AlreadyExists { .. } => LedgerErrorKind::AlreadyExists,
            Self::NotFound { .. } => LedgerErrorKind::NotFound,
            Self::NoSuchHolding { .. } => LedgerErrorKind::NoSuchHolding,
            Self::InsufficientQuantity { .. } => LedgerErrorKind::InsufficientQuantity,
            Self::HasRemainingHoldings { .. } => LedgerErrorKind::HasRemainingHoldings,
            Self::InvalidQuery { .. } => LedgerErrorKind::InvalidQuery,
            Self::StorageFailure { .. } => LedgerErrorKind::StorageFailure,
        }
    }

    /// True when some, but not all, planned writes were applied.
    pub fn is_partial_write(&self) -> bool {
        matches!(
            self,
            Self::StorageFailure { applied, planned, .. } if *applied > 0 && applied < planned
        )
    }
}

/// Error kind enumeration for wire serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerErrorKind {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    NoSuchHolding,
    InsufficientQuantity,
    HasRemainingHoldings,
    InvalidQuery,
    StorageFailure,
}

impl LedgerErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::NoSuchHolding => "no_such_holding",
            Self::InsufficientQuantity => "insufficient_quantity",
            Self::HasRemainingHoldings => "has_remaining_holdings",
            Self::InvalidQuery => "invalid_query",
            Self::StorageFailure => "storage_failure",
        }
    }
}

/// Serializable ledger error returned across the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerErrorPayload {
    pub kind: LedgerErrorKind,
    pub message: String,
}

impl From<&LedgerError> for LedgerErrorPayload {
    fn from(err: &LedgerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<LedgerError> for LedgerErrorPayload {
    fn from(err: LedgerError) -> Self {
        Self::from(&err)
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
    /// Another handle already has the store open for writing.
    #[error("KV store locked: {path} is held by {}", lock_holder(.pid))]
    Locked { path: String, pid: Option<u32> },
}

fn lock_holder(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("process {}", pid),
        None => "another process".to_string(),
    }
}

impl From<KVStoreError> for LedgerError {
    fn from(err: KVStoreError) -> Self {
        LedgerError::storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::storage(format!("record codec: {}", err))
    }
}

/// Failure of a multi-write batch, with the number of writes that landed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("batch failed after {applied} write(s): {source}")]
pub struct BatchWriteError {
    pub applied: usize,
    pub source: KVStoreError,
}

impl BatchWriteError {
    /// Convert into a `LedgerError`, recording the size of the plan.
    pub fn into_ledger_error(self, planned: usize) -> LedgerError {
        LedgerError::StorageFailure {
            message: self.source.to_string(),
            applied: self.applied,
            planned,
        }
    }
}
