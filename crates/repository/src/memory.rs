use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, Version};
use tokio::sync::RwLock;

use crate::{
    Result, StoredAggregate,
    store::{AggregateRepository, SaveOptions, StorableAggregate, check_expected_version},
};

/// In-memory aggregate repository for testing.
///
/// Stores each aggregate as a [`StoredAggregate`] JSON record, the same
/// shape a database-backed repository would persist. Clones share storage.
pub struct InMemoryAggregateRepository<A> {
    records: Arc<RwLock<HashMap<AggregateId, StoredAggregate>>>,
    _phantom: PhantomData<fn() -> A>,
}

impl<A> InMemoryAggregateRepository<A> {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            _phantom: PhantomData,
        }
    }

    /// Returns the number of stored aggregates.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns the raw stored record for an aggregate.
    pub async fn record(&self, id: AggregateId) -> Option<StoredAggregate> {
        self.records.read().await.get(&id).cloned()
    }

    /// Removes every stored aggregate.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

impl<A> Default for InMemoryAggregateRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for InMemoryAggregateRepository<A> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<A: StorableAggregate> AggregateRepository<A> for InMemoryAggregateRepository<A> {
    async fn load(&self, id: AggregateId) -> Result<Option<A>> {
        let records = self.records.read().await;
        match records.get(&id) {
            Some(record) => Ok(Some(record.clone().into_aggregate()?)),
            None => Ok(None),
        }
    }

    async fn save(&self, aggregate: &A, options: SaveOptions) -> Result<Version> {
        let record = StoredAggregate::from_aggregate(aggregate)?;
        let aggregate_id = record.aggregate_id;
        let version = record.version;

        let mut records = self.records.write().await;
        let stored = records.get(&aggregate_id).map(|r| r.version);

        if let Err(err) = check_expected_version(aggregate_id, stored, options) {
            metrics::counter!("aggregate_save_conflicts_total").increment(1);
            tracing::warn!(
                aggregate_type = A::aggregate_type(),
                %aggregate_id,
                error = %err,
                "aggregate save rejected"
            );
            return Err(err);
        }

        tracing::debug!(
            aggregate_type = A::aggregate_type(),
            %aggregate_id,
            %version,
            pending_events = record.pending_events,
            "aggregate saved"
        );
        records.insert(aggregate_id, record);
        metrics::counter!("aggregate_saves_total").increment(1);

        Ok(version)
    }

    async fn delete(&self, id: AggregateId) -> Result<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn stored_version(&self, id: AggregateId) -> Result<Option<Version>> {
        Ok(self.records.read().await.get(&id).map(|r| r.version))
    }
}
