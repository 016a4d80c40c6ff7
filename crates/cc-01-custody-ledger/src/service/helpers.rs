//! # Custody Ledger Service - Helper Methods
//!
//! Validation, timestamping and plan commit shared by the operations.

use tracing::error;

use super::*;
use crate::domain::clock::format_timestamp;
use crate::domain::entities::Quantity;
use crate::domain::errors::LedgerError;
use crate::domain::keys::{check_component, ComponentError};
use crate::ports::outbound::WriteOp;

impl<KV, TS> CustodyLedgerService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Next event timestamp. Caller holds the operation lock.
    pub(crate) fn next_timestamp(&self, clock: &mut MonotonicClock) -> String {
        format_timestamp(clock.issue(self.time_source.now()))
    }

    /// Apply a validated write plan.
    ///
    /// On failure after some writes landed, the ledger is inconsistent; this is
    /// logged at error level and reported with the write counts.
    pub(crate) fn commit(
        &self,
        operation: &'static str,
        plan: Vec<WriteOp>,
    ) -> Result<(), LedgerError> {
        let planned = plan.len();
        self.store.apply_batch(plan).map_err(|batch_err| {
            let applied = batch_err.applied;
            let err = batch_err.into_ledger_error(planned);
            if err.is_partial_write() {
                error!(
                    operation,
                    applied,
                    planned,
                    "[cc-01] Partial write: ledger left inconsistent, {}",
                    err
                );
            }
            err
        })
    }
}

/// Quantities must be strictly positive.
pub(crate) fn check_quantity(quantity: Quantity) -> Result<(), LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::invalid_argument("quantity must be greater than zero"));
    }
    Ok(())
}

/// History query components fail with `InvalidQuery`, not `InvalidArgument`.
pub(crate) fn check_query_component(field: &str, value: &str) -> Result<(), LedgerError> {
    match check_component(value) {
        Ok(()) => Ok(()),
        Err(ComponentError::Empty) => Err(LedgerError::invalid_query(format!(
            "{} must not be empty",
            field
        ))),
        Err(ComponentError::ContainsSeparator) => Err(LedgerError::invalid_query(format!(
            "{} must not contain NUL characters",
            field
        ))),
    }
}

pub(crate) fn overflow(what: &str, lot_id: &str) -> LedgerError {
    LedgerError::invalid_argument(format!("quantity overflows {} of lot {}", what, lot_id))
}
