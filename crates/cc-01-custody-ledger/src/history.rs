//! # History Index
//!
//! Append-only event records stored under composite keys, queried by key
//! prefix.
//!
//! ## Query Semantics
//!
//! A query supplies the first `k` components of the topic schema,
//! `0 <= k <= arity`. The scan returns every event whose key starts with
//! those components, in key order. Since the timestamp is the last
//! component, events under a fixed full prefix come back oldest first.
//!
//! | Topic | Prefix | Returns |
//! |-------|--------|---------|
//! | transfer | `[L1]` | every transfer of lot L1 |
//! | transfer | `[L1, R1]` | transfers of L1 sent by R1 |
//! | transfer | `[L1, R1, P1]` | transfers of L1 from R1 to P1 |

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::LedgerError;
use crate::domain::events::{HistoryRecord, HistoryTopic};
use crate::domain::keys::{check_component, composite_key, ComponentError};
use crate::ports::outbound::{KeyValueStore, WriteOp};

/// Composite-key event index over a shared store.
pub struct HistoryIndex<KV: KeyValueStore> {
    store: Arc<KV>,
}

impl<KV: KeyValueStore> Clone for HistoryIndex<KV> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<KV: KeyValueStore> HistoryIndex<KV> {
    pub fn new(store: Arc<KV>) -> Self {
        Self { store }
    }

    /// Validate and encode one event into a planned write.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: wrong component count, or a component that is
    ///   empty or contains the separator
    /// - `StorageFailure`: the key is already taken (history is never
    ///   overwritten)
    pub fn plan_append<T: Serialize>(
        &self,
        topic: HistoryTopic,
        components: &[&str],
        record: &T,
    ) -> Result<WriteOp, LedgerError> {
        if components.len() != topic.arity() {
            return Err(LedgerError::invalid_argument(format!(
                "{} history key needs {} components, got {}",
                topic.tag(),
                topic.arity(),
                components.len()
            )));
        }
        for (name, component) in topic.schema().iter().zip(components) {
            check_component(component).map_err(|e| {
                LedgerError::invalid_argument(component_message(topic, name, e))
            })?;
        }

        let key = composite_key(topic, components);
        if self.store.exists(&key)? {
            return Err(LedgerError::storage(format!(
                "{} history key already present for {:?}",
                topic.tag(),
                components
            )));
        }

        Ok(WriteOp::put(key, serde_json::to_vec(record)?))
    }

    /// Write one event immediately.
    pub fn append<T: Serialize>(
        &self,
        topic: HistoryTopic,
        components: &[&str],
        record: &T,
    ) -> Result<(), LedgerError> {
        match self.plan_append(topic, components, record)? {
            WriteOp::Put { key, value } => self.store.put(&key, &value)?,
            WriteOp::Delete { key } => self.store.delete(&key)?,
        }
        Ok(())
    }

    /// Planned write for a typed event, keyed by its own components.
    pub fn plan_event<R: HistoryRecord>(&self, event: &R) -> Result<WriteOp, LedgerError> {
        self.plan_append(R::TOPIC, &event.key_components(), event)
    }

    /// Every event under `topic` whose key starts with `prefix`.
    ///
    /// ## Errors
    ///
    /// - `InvalidQuery`: more components than the schema has, or a component
    ///   that is empty or contains the separator
    pub fn query_by_prefix<R: DeserializeOwned>(
        &self,
        topic: HistoryTopic,
        prefix: &[&str],
    ) -> Result<Vec<R>, LedgerError> {
        if prefix.len() > topic.arity() {
            return Err(LedgerError::invalid_query(format!(
                "{} history has {} key components, query gave {}",
                topic.tag(),
                topic.arity(),
                prefix.len()
            )));
        }
        for (name, component) in topic.schema().iter().zip(prefix) {
            check_component(component)
                .map_err(|e| LedgerError::invalid_query(component_message(topic, name, e)))?;
        }

        self.store
            .prefix_scan(&composite_key(topic, prefix))?
            .into_iter()
            .map(|(_, value)| serde_json::from_slice(&value).map_err(LedgerError::from))
            .collect()
    }
}

fn component_message(topic: HistoryTopic, name: &str, err: ComponentError) -> String {
    match err {
        ComponentError::Empty => format!("{} {} must not be empty", topic.tag(), name),
        ComponentError::ContainsSeparator => {
            format!("{} {} must not contain NUL characters", topic.tag(), name)
        }
    }
}
