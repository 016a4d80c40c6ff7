//! # Storage Keys
//!
//! Key naming for entity records and composite history keys.
//!
//! ## Layout
//!
//! | Data | Key |
//! |------|-----|
//! | Collection agent | `agent:collector:{id}` |
//! | Processing agent | `agent:processor:{id}` |
//! | Material lot | `lot:{id}` |
//! | History event | `\0{topic}\0{c1}\0{c2}\0...{cn}\0` |
//!
//! Entity keys are printable; history keys start with `\0`, so the two
//! namespaces never overlap. Every history component is terminated by the
//! separator, which turns a partial key into an exact component boundary:
//! the prefix for lot `L1` does not match lot `L10`.

use super::entities::{AgentKind, EntityKind};
use super::events::HistoryTopic;

/// Separator between composite key components.
pub const COMPONENT_SEPARATOR: char = '\u{0}';

/// Key prefix for agent records.
pub const AGENT_PREFIX: &str = "agent:";

/// Key prefix for lot records.
pub const LOT_PREFIX: &str = "lot:";

/// Storage key of an entity record.
pub fn entity_key(kind: EntityKind, id: &str) -> Vec<u8> {
    match kind {
        EntityKind::Collector => agent_key(AgentKind::Collector, id),
        EntityKind::Processor => agent_key(AgentKind::Processor, id),
        EntityKind::Lot => format!("{}{}", LOT_PREFIX, id).into_bytes(),
    }
}

/// Storage key of an agent record.
pub fn agent_key(kind: AgentKind, id: &str) -> Vec<u8> {
    format!("{}{}:{}", AGENT_PREFIX, kind.as_str(), id).into_bytes()
}

/// Why a composite key component was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentError {
    Empty,
    ContainsSeparator,
}

/// Check a single composite key component.
pub fn check_component(component: &str) -> Result<(), ComponentError> {
    if component.is_empty() {
        return Err(ComponentError::Empty);
    }
    if component.contains(COMPONENT_SEPARATOR) {
        return Err(ComponentError::ContainsSeparator);
    }
    Ok(())
}

/// Build a composite key (or key prefix) from a topic and components.
///
/// Callers validate components with [`check_component`] first; this function
/// only concatenates.
pub fn composite_key(topic: HistoryTopic, components: &[&str]) -> Vec<u8> {
    let capacity = 2 + topic.tag().len() + components.iter().map(|c| c.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPONENT_SEPARATOR);
    key.push_str(topic.tag());
    key.push(COMPONENT_SEPARATOR);
    for component in components {
        key.push_str(component);
        key.push(COMPONENT_SEPARATOR);
    }
    key.into_bytes()
}

/// Split a composite key back into its topic tag and components.
pub fn split_composite_key(key: &[u8]) -> Option<(String, Vec<String>)> {
    let text = std::str::from_utf8(key).ok()?;
    let body = text.strip_prefix(COMPONENT_SEPARATOR)?;
    let mut parts: Vec<String> = body
        .split(COMPONENT_SEPARATOR)
        .map(str::to_string)
        .collect();
    // Trailing separator yields one empty tail segment.
    if parts.pop().as_deref() != Some("") {
        return None;
    }
    if parts.is_empty() {
        return None;
    }
    let topic = parts.remove(0);
    Some((topic, parts))
}
