//! # Ports Layer
//!
//! Defines the port traits for the Custody Ledger subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to callers and the dispatcher)
//! - `outbound.rs` - Driven ports (storage and time, supplied by the host)

pub mod inbound;
pub mod outbound;
