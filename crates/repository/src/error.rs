use common::{AggregateId, Version};
use thiserror::Error;

/// Errors that can occur when loading or saving aggregates.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The stored version did not match the version the caller expected.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// No aggregate is stored under the given ID.
    #[error("{aggregate_type} with id '{aggregate_id}' not found")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
