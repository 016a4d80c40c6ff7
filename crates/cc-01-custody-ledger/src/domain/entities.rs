//! # Domain Entities for the Custody Ledger
//!
//! Agents and material lots as they are persisted in the key-value store.
//!
//! ## Type Decisions
//!
//! - `u64` quantities: non-negative by construction; arithmetic is checked so
//!   that underflow and overflow are reported instead of wrapping.
//! - `BTreeMap` holdings: deterministic serialization, so identical state
//!   always produces identical record bytes.
//! - Collection and processing agents share one record shape. The kind lives
//!   in the storage key, not in the record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Quantity of material in base units.
pub type Quantity = u64;

/// Holdings of an agent: lot id -> quantity. Zero entries are never stored.
pub type Holdings = BTreeMap<String, Quantity>;

/// The two agent roles in the custody chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Recycling organization that collects material.
    Collector,
    /// Organization that receives and processes material.
    Processor,
}

impl AgentKind {
    /// Key namespace segment for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Collector => "collector",
            AgentKind::Processor => "processor",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collector" => Ok(AgentKind::Collector),
            "processor" => Ok(AgentKind::Processor),
            other => Err(format!("unknown agent kind: {}", other)),
        }
    }
}

/// Every entity namespace in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Collector,
    Processor,
    Lot,
}

impl From<AgentKind> for EntityKind {
    fn from(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Collector => EntityKind::Collector,
            AgentKind::Processor => EntityKind::Processor,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Collector => f.write_str("collector"),
            EntityKind::Processor => f.write_str("processor"),
            EntityKind::Lot => f.write_str("lot"),
        }
    }
}

/// A collection or processing agent.
///
/// ## Fields
///
/// - `id`: Unique within its kind
/// - `name`: Display name of the organization
/// - `holdings`: Quantity of each lot currently attributed to this agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub holdings: Holdings,
}

impl AgentRecord {
    /// Create an agent with empty holdings.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            holdings: Holdings::new(),
        }
    }

    /// Quantity held for a lot. Absent holdings read as zero.
    pub fn holding(&self, lot_id: &str) -> Quantity {
        self.holdings.get(lot_id).copied().unwrap_or(0)
    }

    /// Whether a holding entry exists for the lot.
    pub fn holds(&self, lot_id: &str) -> bool {
        self.holdings.contains_key(lot_id)
    }

    /// Add to a holding, creating it if absent. Returns `None` on overflow.
    pub fn credit(&mut self, lot_id: &str, quantity: Quantity) -> Option<Quantity> {
        let updated = self.holding(lot_id).checked_add(quantity)?;
        if updated > 0 {
            self.holdings.insert(lot_id.to_string(), updated);
        }
        Some(updated)
    }

    /// Subtract from a holding. Returns `None` if the holding is smaller than
    /// `quantity`. A holding that reaches zero is removed.
    pub fn debit(&mut self, lot_id: &str, quantity: Quantity) -> Option<Quantity> {
        let remaining = self.holding(lot_id).checked_sub(quantity)?;
        if remaining == 0 {
            self.holdings.remove(lot_id);
        } else {
            self.holdings.insert(lot_id.to_string(), remaining);
        }
        Some(remaining)
    }
}

/// An identified batch of material tracked by aggregate quantity.
///
/// `total_quantity` is the quantity of this lot still alive across the whole
/// system: increased by collection, reduced by processing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub total_quantity: Quantity,
}

impl MaterialLot {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        total_quantity: Quantity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            total_quantity,
        }
    }

    /// A depleted lot has no quantity left but keeps its record.
    pub fn is_depleted(&self) -> bool {
        self.total_quantity == 0
    }
}
