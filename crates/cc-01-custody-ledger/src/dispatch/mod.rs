//! # Dispatch Layer
//!
//! String-named operations in, structured responses out.
//!
//! ```text
//! ("Transfer", ["R1","P1","L1","60"])
//!        │ LedgerCommand::parse
//!        ▼
//! LedgerCommand::Transfer { .. } ──▶ CustodyLedgerApi ──▶ LedgerResponse
//! ```

mod command;
mod handler;

pub use command::{canonical_operation, LedgerCommand, OPERATIONS};
pub use handler::{LedgerDispatcher, LedgerResponse};
