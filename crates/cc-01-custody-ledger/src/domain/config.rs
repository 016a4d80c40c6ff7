//! # Ledger Configuration
//!
//! Input limits enforced by the operations engine before any write.

use serde::{Deserialize, Serialize};

use super::errors::LedgerError;
use super::keys::{check_component, ComponentError};

/// Configuration for the Custody Ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum length in bytes of agent and lot ids (default: 128).
    ///
    /// Ids become storage key components, so they are also checked for the
    /// composite key separator.
    pub max_identifier_len: usize,

    /// Maximum length in bytes of free-text fields such as names, lot
    /// category and processing method (default: 256).
    pub max_field_len: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_identifier_len: 128,
            max_field_len: 256,
        }
    }
}

impl LedgerConfig {
    /// Create a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum identifier length.
    pub fn with_max_identifier_len(mut self, len: usize) -> Self {
        self.max_identifier_len = len;
        self
    }

    /// Set the maximum free-text field length.
    pub fn with_max_field_len(mut self, len: usize) -> Self {
        self.max_field_len = len;
        self
    }

    /// Validate an identifier argument.
    pub fn check_identifier(&self, field: &str, value: &str) -> Result<(), LedgerError> {
        match check_component(value) {
            Err(ComponentError::Empty) => {
                return Err(LedgerError::invalid_argument(format!("{} must not be empty", field)))
            }
            Err(ComponentError::ContainsSeparator) => {
                return Err(LedgerError::invalid_argument(format!(
                    "{} must not contain NUL characters",
                    field
                )))
            }
            Ok(()) => {}
        }
        if value.len() > self.max_identifier_len {
            return Err(LedgerError::invalid_argument(format!(
                "{} exceeds {} bytes",
                field, self.max_identifier_len
            )));
        }
        Ok(())
    }

    /// Validate a free-text argument.
    pub fn check_field(&self, field: &str, value: &str) -> Result<(), LedgerError> {
        if value.is_empty() {
            return Err(LedgerError::invalid_argument(format!("{} must not be empty", field)));
        }
        if value.len() > self.max_field_len {
            return Err(LedgerError::invalid_argument(format!(
                "{} exceeds {} bytes",
                field, self.max_field_len
            )));
        }
        Ok(())
    }
}
