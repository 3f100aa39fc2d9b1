//! Domain error types.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No entity with the given ID exists.
    #[error("{entity_type} with id '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Input failed validation.
    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    /// The operation is not allowed in the aggregate's current state.
    #[error("Invalid state transition: cannot {action} a {aggregate_type} in {current_state} state")]
    InvalidStateTransition {
        aggregate_type: &'static str,
        current_state: String,
        action: &'static str,
    },
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::ValidationFailed(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = DomainError::not_found("Account", "a-42");
        assert_eq!(err.to_string(), "Account with id 'a-42' not found");
    }

    #[test]
    fn validation_errors_convert() {
        let err: DomainError = ValidationErrors::field("reason", "is required").into();
        assert!(matches!(
            err,
            DomainError::ValidationFailed(ref errors) if errors.get("reason") == Some("is required")
        ));
    }
}
