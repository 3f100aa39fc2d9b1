use async_trait::async_trait;
use common::{AggregateId, Version};
use domain::Aggregate;
use serde::{Serialize, de::DeserializeOwned};

use crate::{RepositoryError, Result};

/// Aggregates that can be written to and read back from a repository.
pub trait StorableAggregate: Aggregate + Serialize + DeserializeOwned + 'static {}

impl<A> StorableAggregate for A where A: Aggregate + Serialize + DeserializeOwned + 'static {}

/// Options for saving an aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Version the stored record must currently have for the save to succeed.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl SaveOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stored record to be at `version`.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting nothing to be stored yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Loads and saves aggregates by ID.
///
/// Saves are checked against the stored version so that two writers
/// working from the same prior version cannot both succeed.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait AggregateRepository<A: StorableAggregate>: Send + Sync {
    /// Loads an aggregate, returning None if nothing is stored under `id`.
    async fn load(&self, id: AggregateId) -> Result<Option<A>>;

    /// Writes the aggregate, including its pending events.
    ///
    /// Fails with `ConcurrencyConflict` if `options.expected_version` is set
    /// and differs from the stored version (a missing record counts as
    /// version 0). Returns the version now stored.
    async fn save(&self, aggregate: &A, options: SaveOptions) -> Result<Version>;

    /// Removes the aggregate. Returns true if something was removed.
    async fn delete(&self, id: AggregateId) -> Result<bool>;

    /// Returns the stored version, or None if the aggregate doesn't exist.
    async fn stored_version(&self, id: AggregateId) -> Result<Option<Version>>;

    /// Loads an aggregate that must exist.
    async fn get(&self, id: AggregateId) -> Result<A> {
        self.load(id).await?.ok_or(RepositoryError::NotFound {
            aggregate_type: A::aggregate_type(),
            aggregate_id: id,
        })
    }

    /// Checks if an aggregate is stored.
    async fn exists(&self, id: AggregateId) -> Result<bool> {
        Ok(self.stored_version(id).await?.is_some())
    }
}

/// Compares the stored version against the caller's expectation.
pub fn check_expected_version(
    aggregate_id: AggregateId,
    stored: Option<Version>,
    options: SaveOptions,
) -> Result<()> {
    let Some(expected) = options.expected_version else {
        return Ok(());
    };

    let actual = stored.unwrap_or(Version::initial());
    if actual != expected {
        return Err(RepositoryError::ConcurrencyConflict {
            aggregate_id,
            expected,
            actual,
        });
    }
    Ok(())
}
