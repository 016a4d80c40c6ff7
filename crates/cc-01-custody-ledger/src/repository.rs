//! # Entity Repository
//!
//! Maps `(EntityKind, id)` to storage keys and marshals records as JSON.
//! No business validation happens here.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::entities::{AgentKind, AgentRecord, EntityKind, MaterialLot};
use crate::domain::errors::LedgerError;
use crate::domain::keys::entity_key;
use crate::ports::outbound::{KeyValueStore, WriteOp};

/// Typed access to agent and lot records.
pub struct EntityRepository<KV: KeyValueStore> {
    store: Arc<KV>,
}

impl<KV: KeyValueStore> Clone for EntityRepository<KV> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<KV: KeyValueStore> EntityRepository<KV> {
    pub fn new(store: Arc<KV>) -> Self {
        Self { store }
    }

    /// Load a record, failing with `NotFound` if absent.
    pub fn load<T: DeserializeOwned>(&self, kind: EntityKind, id: &str) -> Result<T, LedgerError> {
        self.load_optional(kind, id)?
            .ok_or_else(|| LedgerError::not_found(kind, id))
    }

    /// Load a record if present.
    pub fn load_optional<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<T>, LedgerError> {
        match self.store.get(&entity_key(kind, id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Overwrite a record unconditionally.
    pub fn save<T: Serialize>(
        &self,
        kind: EntityKind,
        id: &str,
        record: &T,
    ) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(record)?;
        self.store.put(&entity_key(kind, id), &bytes)?;
        Ok(())
    }

    pub fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, LedgerError> {
        Ok(self.store.exists(&entity_key(kind, id))?)
    }

    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<(), LedgerError> {
        self.store.delete(&entity_key(kind, id))?;
        Ok(())
    }

    /// Encode a record into a planned write.
    pub fn plan_save<T: Serialize>(
        &self,
        kind: EntityKind,
        id: &str,
        record: &T,
    ) -> Result<WriteOp, LedgerError> {
        Ok(WriteOp::put(entity_key(kind, id), serde_json::to_vec(record)?))
    }

    /// Planned removal of a record.
    pub fn plan_remove(&self, kind: EntityKind, id: &str) -> WriteOp {
        WriteOp::delete(entity_key(kind, id))
    }

    // Typed shorthands used by the operations engine.

    pub fn load_agent(&self, kind: AgentKind, id: &str) -> Result<AgentRecord, LedgerError> {
        self.load(kind.into(), id)
    }

    pub fn load_lot(&self, id: &str) -> Result<MaterialLot, LedgerError> {
        self.load(EntityKind::Lot, id)
    }

    pub fn plan_save_agent(
        &self,
        kind: AgentKind,
        agent: &AgentRecord,
    ) -> Result<WriteOp, LedgerError> {
        self.plan_save(kind.into(), &agent.id, agent)
    }

    pub fn plan_save_lot(&self, lot: &MaterialLot) -> Result<WriteOp, LedgerError> {
        self.plan_save(EntityKind::Lot, &lot.id, lot)
    }
}
