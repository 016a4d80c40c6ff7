//! # History Events
//!
//! Immutable audit records appended on every successful custody operation.
//!
//! Each event type belongs to one [`HistoryTopic`], whose schema fixes the
//! ordered key components. The timestamp is always the last component, so
//! events sharing a key prefix scan back in time order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::entities::Quantity;

/// History topics and their composite-key schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryTopic {
    /// `(agent_id, lot_id, timestamp)`
    Collection,
    /// `(lot_id, from_agent_id, to_agent_id, timestamp)`
    Transfer,
    /// `(processor_id, lot_id, timestamp)`
    Processing,
}

impl HistoryTopic {
    /// Topic tag written at the head of every composite key.
    pub fn tag(&self) -> &'static str {
        match self {
            HistoryTopic::Collection => "collection",
            HistoryTopic::Transfer => "transfer",
            HistoryTopic::Processing => "processing",
        }
    }

    /// Names of the key components, in key order.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            HistoryTopic::Collection => &["agent_id", "lot_id", "timestamp"],
            HistoryTopic::Transfer => &["lot_id", "from_agent_id", "to_agent_id", "timestamp"],
            HistoryTopic::Processing => &["processor_id", "lot_id", "timestamp"],
        }
    }

    /// Number of key components in a full key.
    pub fn arity(&self) -> usize {
        self.schema().len()
    }
}

/// A record that can be appended to the history index.
pub trait HistoryRecord: Serialize + DeserializeOwned {
    /// Topic this record is filed under.
    const TOPIC: HistoryTopic;

    /// Full key tuple, in the order of `TOPIC.schema()`.
    fn key_components(&self) -> Vec<&str>;
}

/// Material collected by a collection agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub agent_id: String,
    pub lot_id: String,
    pub quantity: Quantity,
    pub timestamp: String,
}

impl HistoryRecord for CollectionEvent {
    const TOPIC: HistoryTopic = HistoryTopic::Collection;

    fn key_components(&self) -> Vec<&str> {
        vec![
            self.agent_id.as_str(),
            self.lot_id.as_str(),
            self.timestamp.as_str(),
        ]
    }
}

/// Material moved from a collection agent to a processing agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub lot_id: String,
    pub from_agent_id: String,
    pub to_agent_id: String,
    pub quantity: Quantity,
    pub timestamp: String,
}

impl HistoryRecord for TransferEvent {
    const TOPIC: HistoryTopic = HistoryTopic::Transfer;

    fn key_components(&self) -> Vec<&str> {
        vec![
            self.lot_id.as_str(),
            self.from_agent_id.as_str(),
            self.to_agent_id.as_str(),
            self.timestamp.as_str(),
        ]
    }
}

/// Material consumed by a processing agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    pub processor_id: String,
    pub lot_id: String,
    pub method: String,
    pub quantity: Quantity,
    pub timestamp: String,
}

impl HistoryRecord for ProcessingEvent {
    const TOPIC: HistoryTopic = HistoryTopic::Processing;

    fn key_components(&self) -> Vec<&str> {
        vec![
            self.processor_id.as_str(),
            self.lot_id.as_str(),
            self.timestamp.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_components_match_schema_arity() {
        let collection = CollectionEvent {
            agent_id: "R1".into(),
            lot_id: "L1".into(),
            quantity: 1,
            timestamp: "t".into(),
        };
        let transfer = TransferEvent {
            lot_id: "L1".into(),
            from_agent_id: "R1".into(),
            to_agent_id: "P1".into(),
            quantity: 1,
            timestamp: "t".into(),
        };
        let processing = ProcessingEvent {
            processor_id: "P1".into(),
            lot_id: "L1".into(),
            method: "shred".into(),
            quantity: 1,
            timestamp: "t".into(),
        };

        assert_eq!(collection.key_components().len(), CollectionEvent::TOPIC.arity());
        assert_eq!(transfer.key_components().len(), TransferEvent::TOPIC.arity());
        assert_eq!(processing.key_components().len(), ProcessingEvent::TOPIC.arity());
    }

    #[test]
    fn test_timestamp_is_last_component() {
        for topic in [
            HistoryTopic::Collection,
            HistoryTopic::Transfer,
            HistoryTopic::Processing,
        ] {
            assert_eq!(topic.schema().last(), Some(&"timestamp"));
        }
    }
}
