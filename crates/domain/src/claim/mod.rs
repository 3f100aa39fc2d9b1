//! Claim aggregate and related types.

mod aggregate;
mod events;
mod state;
mod value_objects;

pub use aggregate::Claim;
pub use events::{
    ClaimAcceptedData, ClaimEvent, ClaimPaidData, ClaimRejectedData, ClaimSubmittedData,
    DocumentsRequestedData, ReviewStartedData, SCHEMA_VERSION,
};
pub use state::ClaimStatus;
pub use value_objects::{ClaimSubmission, CustomerId, Money, PolicyId};

use thiserror::Error;

use crate::error::DomainError;
use crate::validation::ValidationErrors;

/// Errors that can occur during claim operations.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Claim is not in a state that allows the action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: ClaimStatus,
        action: &'static str,
    },
}

impl From<ValidationErrors> for ClaimError {
    fn from(errors: ValidationErrors) -> Self {
        ClaimError::Validation(errors)
    }
}

impl From<ClaimError> for DomainError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(errors) => DomainError::ValidationFailed(errors),
            ClaimError::InvalidStateTransition {
                current_state,
                action,
            } => DomainError::InvalidStateTransition {
                aggregate_type: "Claim",
                current_state: current_state.to_string(),
                action,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_maps_to_domain_error() {
        let err: DomainError = ClaimError::InvalidStateTransition {
            current_state: ClaimStatus::Paid,
            action: "reject",
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Invalid state transition: cannot reject a Claim in PAID state"
        );
    }

    #[test]
    fn validation_error_keeps_field_errors() {
        let err: DomainError =
            ClaimError::Validation(ValidationErrors::field("amount", "must be positive")).into();

        match err {
            DomainError::ValidationFailed(errors) => {
                assert_eq!(errors.get("amount"), Some("must be positive"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
