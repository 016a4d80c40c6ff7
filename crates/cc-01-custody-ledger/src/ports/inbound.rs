//! # Inbound Ports (Driving Ports)
//!
//! The primary API for the Custody Ledger subsystem.

use crate::domain::entities::{AgentKind, AgentRecord, MaterialLot, Quantity};
use crate::domain::errors::LedgerError;
use crate::domain::events::{CollectionEvent, ProcessingEvent, TransferEvent};

/// Primary API for the Custody Ledger subsystem.
///
/// Every mutating operation validates completely before it writes. A failed
/// operation leaves the store untouched, except for `StorageFailure` with
/// `applied > 0` on a store without atomic batches.
pub trait CustodyLedgerApi {
    /// Register a new agent with empty holdings.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty or oversized id or name
    /// - `AlreadyExists`: an agent of this kind with this id exists
    fn register_agent(&self, kind: AgentKind, id: &str, name: &str) -> Result<(), LedgerError>;

    /// Read an agent record.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no agent of this kind with this id
    fn query_agent(&self, kind: AgentKind, id: &str) -> Result<AgentRecord, LedgerError>;

    /// Delete an agent.
    ///
    /// A processor must hold nothing. A collector's holdings are subtracted
    /// from the totals of the lots it holds; lots reaching zero are removed.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: agent missing, or a held lot is missing
    /// - `HasRemainingHoldings`: processor still holds material
    /// - `InsufficientQuantity`: a lot total is smaller than the holding
    fn delete_agent(&self, kind: AgentKind, id: &str) -> Result<(), LedgerError>;

    /// Record material collected by a collector, creating the lot on first
    /// collection.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty strings, zero quantity, or a quantity that
    ///   would overflow the holding or lot total
    /// - `NotFound`: collector missing
    fn collect(
        &self,
        lot_id: &str,
        name: &str,
        category: &str,
        quantity: Quantity,
        agent_id: &str,
    ) -> Result<CollectionEvent, LedgerError>;

    /// Move quantity of a lot from a collector to a processor.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty ids or zero quantity
    /// - `NotFound`: sender, receiver or lot missing
    /// - `NoSuchHolding`: sender holds none of the lot
    /// - `InsufficientQuantity`: sender holds less than requested
    fn transfer(
        &self,
        from_agent_id: &str,
        to_agent_id: &str,
        lot_id: &str,
        quantity: Quantity,
    ) -> Result<TransferEvent, LedgerError>;

    /// Consume quantity of a lot held by a processor.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty ids or method, zero quantity
    /// - `NotFound`: processor or lot missing
    /// - `NoSuchHolding`: processor holds none of the lot
    /// - `InsufficientQuantity`: holding or lot total smaller than requested
    fn process(
        &self,
        processor_id: &str,
        lot_id: &str,
        method: &str,
        quantity: Quantity,
    ) -> Result<ProcessingEvent, LedgerError>;

    /// Read a lot record.
    fn query_lot(&self, lot_id: &str) -> Result<MaterialLot, LedgerError>;

    /// Collection events of a collector, optionally narrowed to one lot.
    fn query_collection_history(
        &self,
        agent_id: &str,
        lot_id: Option<&str>,
    ) -> Result<Vec<CollectionEvent>, LedgerError>;

    /// Transfer events of a lot, optionally narrowed by sender and then
    /// receiver.
    ///
    /// ## Errors
    ///
    /// - `InvalidQuery`: receiver given without sender
    fn query_transfer_history(
        &self,
        lot_id: &str,
        from_agent_id: Option<&str>,
        to_agent_id: Option<&str>,
    ) -> Result<Vec<TransferEvent>, LedgerError>;

    /// Processing events of a processor, optionally narrowed to one lot.
    fn query_processing_history(
        &self,
        processor_id: &str,
        lot_id: Option<&str>,
    ) -> Result<Vec<ProcessingEvent>, LedgerError>;
}
