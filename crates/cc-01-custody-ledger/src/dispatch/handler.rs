//! # Ledger Dispatcher
//!
//! Executes decoded commands against a `CustodyLedgerApi` and wraps the
//! outcome in a `LedgerResponse`.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use super::command::{canonical_operation, LedgerCommand};
use crate::domain::errors::{LedgerError, LedgerErrorPayload};
use crate::ports::inbound::CustodyLedgerApi;

/// Result of one dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerResponse {
    /// JSON of the queried record or list. Empty for mutations.
    Success { payload: Vec<u8> },
    Failure(LedgerErrorPayload),
}

impl LedgerResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, LedgerResponse::Success { .. })
    }

    /// Render for the CLI:
    /// `{"status":"ok","payload":...}` or
    /// `{"status":"error","kind":...,"message":...}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            LedgerResponse::Success { payload } => {
                let payload = if payload.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_slice(payload).unwrap_or(serde_json::Value::Null)
                };
                serde_json::json!({ "status": "ok", "payload": payload })
            }
            LedgerResponse::Failure(error) => serde_json::json!({
                "status": "error",
                "kind": error.kind,
                "message": error.message,
            }),
        }
    }
}

impl From<Result<Vec<u8>, LedgerError>> for LedgerResponse {
    fn from(result: Result<Vec<u8>, LedgerError>) -> Self {
        match result {
            Ok(payload) => LedgerResponse::Success { payload },
            Err(e) => LedgerResponse::Failure(e.into()),
        }
    }
}

/// Named-operation front end for the ledger.
pub struct LedgerDispatcher<S: CustodyLedgerApi> {
    service: S,
}

impl<S: CustodyLedgerApi> LedgerDispatcher<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Decode and execute one operation.
    pub fn dispatch(&self, operation: &str, args: &[String]) -> LedgerResponse {
        let started = Instant::now();
        let label = canonical_operation(operation).unwrap_or("unknown");

        let result = LedgerCommand::parse(operation, args).and_then(|command| {
            debug!(operation = label, "[cc-01] Dispatching {:?}", command);
            self.execute(&command).map(|payload| (command, payload))
        });

        match result {
            Ok((command, payload)) => {
                record_success(&command, started);
                LedgerResponse::Success { payload }
            }
            Err(e) => {
                warn!(
                    operation = label,
                    kind = e.kind().as_str(),
                    "[cc-01] {} rejected: {}",
                    label,
                    e
                );
                record_failure(label, &e, started);
                LedgerResponse::Failure(e.into())
            }
        }
    }

    /// Execute an already decoded command, returning the JSON payload.
    pub fn execute(&self, command: &LedgerCommand) -> Result<Vec<u8>, LedgerError> {
        let s = &self.service;
        match command {
            LedgerCommand::RegisterAgent { kind, id, name } => {
                s.register_agent(*kind, id, name).map(|_| Vec::new())
            }
            LedgerCommand::QueryAgent { kind, id } => encode(&s.query_agent(*kind, id)?),
            LedgerCommand::DeleteAgent { kind, id } => {
                s.delete_agent(*kind, id).map(|_| Vec::new())
            }
            LedgerCommand::Collect {
                lot_id,
                name,
                category,
                quantity,
                agent_id,
            } => s
                .collect(lot_id, name, category, *quantity, agent_id)
                .map(|_| Vec::new()),
            LedgerCommand::Transfer {
                from_agent_id,
                to_agent_id,
                lot_id,
                quantity,
            } => s
                .transfer(from_agent_id, to_agent_id, lot_id, *quantity)
                .map(|_| Vec::new()),
            LedgerCommand::Process {
                processor_id,
                lot_id,
                method,
                quantity,
            } => s
                .process(processor_id, lot_id, method, *quantity)
                .map(|_| Vec::new()),
            LedgerCommand::QueryLot { lot_id } => encode(&s.query_lot(lot_id)?),
            LedgerCommand::QueryCollectionHistory { agent_id, lot_id } => {
                encode(&s.query_collection_history(agent_id, lot_id.as_deref())?)
            }
            LedgerCommand::QueryTransferHistory {
                lot_id,
                from_agent_id,
                to_agent_id,
            } => encode(&s.query_transfer_history(
                lot_id,
                from_agent_id.as_deref(),
                to_agent_id.as_deref(),
            )?),
            LedgerCommand::QueryProcessingHistory {
                processor_id,
                lot_id,
            } => encode(&s.query_processing_history(processor_id, lot_id.as_deref())?),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(feature = "metrics")]
fn record_success(command: &LedgerCommand, started: Instant) {
    use custody_telemetry::metrics;

    let operation = command.operation();
    metrics::record_operation(operation, "ok", started.elapsed().as_secs_f64());
    match command {
        LedgerCommand::Collect { quantity, .. } => metrics::QUANTITY_COLLECTED.inc_by(*quantity),
        LedgerCommand::Transfer { quantity, .. } => metrics::QUANTITY_TRANSFERRED.inc_by(*quantity),
        LedgerCommand::Process { quantity, .. } => metrics::QUANTITY_PROCESSED.inc_by(*quantity),
        _ => {}
    }
}

#[cfg(not(feature = "metrics"))]
fn record_success(_command: &LedgerCommand, _started: Instant) {}

#[cfg(feature = "metrics")]
fn record_failure(operation: &str, error: &LedgerError, started: Instant) {
    use custody_telemetry::metrics;

    metrics::record_operation(operation, error.kind().as_str(), started.elapsed().as_secs_f64());
    if error.is_partial_write() {
        metrics::PARTIAL_WRITES.inc();
    }
}

#[cfg(not(feature = "metrics"))]
fn record_failure(_operation: &str, _error: &LedgerError, _started: Instant) {}
