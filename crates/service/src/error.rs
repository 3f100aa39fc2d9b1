use common::{AggregateId, Version};
use domain::{ClaimError, DomainError, ValidationErrors};
use messaging::DispatchError;
use repository::RepositoryError;
use thiserror::Error;

/// Errors returned by application services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested aggregate does not exist.
    #[error("{entity_type} with id '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The command's input was rejected, with per-field messages.
    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    /// Another writer saved the aggregate first.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The command is not allowed in the aggregate's current state.
    #[error(transparent)]
    Domain(DomainError),

    /// Events could not be published. The aggregate itself was committed.
    #[error("Event dispatch failed: {0}")]
    Transport(#[from] DispatchError),

    /// Any other persistence failure.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    /// Returns the field errors if this is a validation failure.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => ServiceError::NotFound { entity_type, id },
            DomainError::ValidationFailed(errors) => ServiceError::ValidationFailed(errors),
            other => ServiceError::Domain(other),
        }
    }
}

impl From<ClaimError> for ServiceError {
    fn from(err: ClaimError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            } => ServiceError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            },
            RepositoryError::NotFound {
                aggregate_type,
                aggregate_id,
            } => ServiceError::NotFound {
                entity_type: aggregate_type,
                id: aggregate_id.to_string(),
            },
            other => ServiceError::Repository(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
