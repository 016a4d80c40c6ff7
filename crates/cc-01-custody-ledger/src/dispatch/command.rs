//! # Ledger Commands
//!
//! `(operation name, [string args])` decoded once into a typed command.
//!
//! Operation names accept both the current names and the aliases used by
//! earlier deployments of the ledger.

use crate::domain::entities::{AgentKind, Quantity};
use crate::domain::errors::LedgerError;

/// A fully decoded ledger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    RegisterAgent {
        kind: AgentKind,
        id: String,
        name: String,
    },
    QueryAgent {
        kind: AgentKind,
        id: String,
    },
    DeleteAgent {
        kind: AgentKind,
        id: String,
    },
    Collect {
        lot_id: String,
        name: String,
        category: String,
        quantity: Quantity,
        agent_id: String,
    },
    Transfer {
        from_agent_id: String,
        to_agent_id: String,
        lot_id: String,
        quantity: Quantity,
    },
    Process {
        processor_id: String,
        lot_id: String,
        method: String,
        quantity: Quantity,
    },
    QueryLot {
        lot_id: String,
    },
    QueryCollectionHistory {
        agent_id: String,
        lot_id: Option<String>,
    },
    QueryTransferHistory {
        lot_id: String,
        from_agent_id: Option<String>,
        to_agent_id: Option<String>,
    },
    QueryProcessingHistory {
        processor_id: String,
        lot_id: Option<String>,
    },
}

/// `(canonical name, legacy alias)` for every operation.
pub const OPERATIONS: &[(&str, Option<&str>)] = &[
    ("RegisterCollector", Some("RecyclerRegister")),
    ("RegisterProcessor", Some("ProcessorRegister")),
    ("QueryCollector", Some("RecyclerQuery")),
    ("QueryProcessor", Some("ProcessorQuery")),
    ("DeleteCollector", Some("RecyclerDelete")),
    ("DeleteProcessor", Some("ProcessorDelete")),
    ("Collect", Some("TrashEnroll")),
    ("Transfer", Some("TrashTrans")),
    ("Process", Some("TrashProcess")),
    ("QueryLot", None),
    ("QueryCollectionHistory", Some("queryRecyleHistory")),
    ("QueryTransferHistory", Some("queryTransHistory")),
    ("QueryProcessingHistory", Some("queryProcessHistory")),
];

/// Resolve an operation name or alias to its canonical name.
pub fn canonical_operation(operation: &str) -> Option<&'static str> {
    OPERATIONS
        .iter()
        .find(|(name, alias)| *name == operation || *alias == Some(operation))
        .map(|(name, _)| *name)
}

impl LedgerCommand {
    /// Decode an operation and its string arguments.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: unknown operation, wrong argument count, or a
    ///   quantity that is not a positive base-10 integer
    pub fn parse(operation: &str, args: &[String]) -> Result<Self, LedgerError> {
        let name = canonical_operation(operation).ok_or_else(|| {
            LedgerError::invalid_argument(format!("unknown operation: {}", operation))
        })?;

        let command = match name {
            "RegisterCollector" | "RegisterProcessor" => {
                let [id, agent_name] = exact::<2>(name, args)?;
                LedgerCommand::RegisterAgent {
                    kind: agent_kind(name),
                    id,
                    name: agent_name,
                }
            }
            "QueryCollector" | "QueryProcessor" => {
                let [id] = exact::<1>(name, args)?;
                LedgerCommand::QueryAgent {
                    kind: agent_kind(name),
                    id,
                }
            }
            "DeleteCollector" | "DeleteProcessor" => {
                let [id] = exact::<1>(name, args)?;
                LedgerCommand::DeleteAgent {
                    kind: agent_kind(name),
                    id,
                }
            }
            "Collect" => {
                let [lot_id, lot_name, category, quantity, agent_id] = exact::<5>(name, args)?;
                LedgerCommand::Collect {
                    lot_id,
                    name: lot_name,
                    category,
                    quantity: parse_quantity(&quantity)?,
                    agent_id,
                }
            }
            "Transfer" => {
                let [from_agent_id, to_agent_id, lot_id, quantity] = exact::<4>(name, args)?;
                LedgerCommand::Transfer {
                    from_agent_id,
                    to_agent_id,
                    lot_id,
                    quantity: parse_quantity(&quantity)?,
                }
            }
            "Process" => {
                let [processor_id, lot_id, method, quantity] = exact::<4>(name, args)?;
                LedgerCommand::Process {
                    processor_id,
                    lot_id,
                    method,
                    quantity: parse_quantity(&quantity)?,
                }
            }
            "QueryLot" => {
                let [lot_id] = exact::<1>(name, args)?;
                LedgerCommand::QueryLot { lot_id }
            }
            "QueryCollectionHistory" => {
                let mut rest = between(name, args, 1, 2)?;
                LedgerCommand::QueryCollectionHistory {
                    agent_id: rest.remove(0),
                    lot_id: rest.pop(),
                }
            }
            "QueryTransferHistory" => {
                let mut rest = between(name, args, 1, 3)?.into_iter();
                LedgerCommand::QueryTransferHistory {
                    lot_id: rest.next().unwrap_or_default(),
                    from_agent_id: rest.next(),
                    to_agent_id: rest.next(),
                }
            }
            "QueryProcessingHistory" => {
                let mut rest = between(name, args, 1, 2)?;
                LedgerCommand::QueryProcessingHistory {
                    processor_id: rest.remove(0),
                    lot_id: rest.pop(),
                }
            }
            other => {
                return Err(LedgerError::invalid_argument(format!(
                    "unknown operation: {}",
                    other
                )))
            }
        };

        Ok(command)
    }

    /// Canonical operation name, used for logs and metric labels.
    pub fn operation(&self) -> &'static str {
        match self {
            LedgerCommand::RegisterAgent { kind: AgentKind::Collector, .. } => "RegisterCollector",
            LedgerCommand::RegisterAgent { kind: AgentKind::Processor, .. } => "RegisterProcessor",
            LedgerCommand::QueryAgent { kind: AgentKind::Collector, .. } => "QueryCollector",
            LedgerCommand::QueryAgent { kind: AgentKind::Processor, .. } => "QueryProcessor",
            LedgerCommand::DeleteAgent { kind: AgentKind::Collector, .. } => "DeleteCollector",
            LedgerCommand::DeleteAgent { kind: AgentKind::Processor, .. } => "DeleteProcessor",
            LedgerCommand::Collect { .. } => "Collect",
            LedgerCommand::Transfer { .. } => "Transfer",
            LedgerCommand::Process { .. } => "Process",
            LedgerCommand::QueryLot { .. } => "QueryLot",
            LedgerCommand::QueryCollectionHistory { .. } => "QueryCollectionHistory",
            LedgerCommand::QueryTransferHistory { .. } => "QueryTransferHistory",
            LedgerCommand::QueryProcessingHistory { .. } => "QueryProcessingHistory",
        }
    }

    /// Whether the command writes to the ledger.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            LedgerCommand::RegisterAgent { .. }
                | LedgerCommand::DeleteAgent { .. }
                | LedgerCommand::Collect { .. }
                | LedgerCommand::Transfer { .. }
                | LedgerCommand::Process { .. }
        )
    }
}

fn agent_kind(operation: &str) -> AgentKind {
    if operation.ends_with("Processor") {
        AgentKind::Processor
    } else {
        AgentKind::Collector
    }
}

fn exact<const N: usize>(operation: &str, args: &[String]) -> Result<[String; N], LedgerError> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| {
        LedgerError::invalid_argument(format!(
            "{} expects {} argument(s), got {}",
            operation,
            N,
            args.len()
        ))
    })
}

fn between(
    operation: &str,
    args: &[String],
    min: usize,
    max: usize,
) -> Result<Vec<String>, LedgerError> {
    if args.len() < min || args.len() > max {
        return Err(LedgerError::invalid_argument(format!(
            "{} expects {} to {} arguments, got {}",
            operation,
            min,
            max,
            args.len()
        )));
    }
    Ok(args.to_vec())
}

/// Positive base-10 integer. Signs, fractions and zero are rejected.
fn parse_quantity(raw: &str) -> Result<Quantity, LedgerError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::invalid_argument(format!(
            "quantity must be a positive integer, got {:?}",
            raw
        )));
    }
    match raw.parse::<Quantity>() {
        Ok(0) => Err(LedgerError::invalid_argument("quantity must be greater than zero")),
        Ok(quantity) => Ok(quantity),
        Err(_) => Err(LedgerError::invalid_argument(format!(
            "quantity out of range: {}",
            raw
        ))),
    }
}
