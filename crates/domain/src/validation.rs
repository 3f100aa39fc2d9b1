//! Field-level validation errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation failure with per-field messages.
///
/// Fields are kept sorted so rendered messages are stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationErrors {
    message: String,
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Creates an empty error set with a summary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Creates an error set for a single field.
    pub fn field(field: impl Into<String>, error: impl Into<String>) -> Self {
        let field = field.into();
        let mut errors = Self::new(format!("Validation failed for field: {field}"));
        errors.add(field, error);
        errors
    }

    /// Records an error for `field`, replacing any earlier one.
    pub fn add(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.errors.insert(field.into(), error.into());
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `Err(self)` if any field error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}
