//! Commit-then-dispatch orchestration shared by every aggregate service.

use std::marker::PhantomData;

use common::{AggregateId, Version};
use domain::{Aggregate, HasPendingEvents, Mutable};
use messaging::{DefaultTopic, DispatchReport, EventDispatcher, RoutingRule, Transport};
use repository::{AggregateRepository, RepositoryError, SaveOptions, StorableAggregate};

use crate::error::Result;

/// Persists aggregates and publishes their events once the save has
/// succeeded.
///
/// A command runs in two steps. [`commit`](Self::commit) saves the aggregate
/// together with its pending events. [`dispatch`](Self::dispatch) then sends
/// them and saves the cleared buffer. If the process stops between the two
/// steps, the events are still stored and [`redispatch`](Self::redispatch)
/// sends them later.
pub struct ApplicationService<A, R, T, Rt = DefaultTopic> {
    repository: R,
    transport: T,
    dispatcher: EventDispatcher<Rt>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, R, T, Rt> ApplicationService<A, R, T, Rt>
where
    A: StorableAggregate,
    R: AggregateRepository<A>,
    T: Transport<<A as Aggregate>::Event>,
    Rt: RoutingRule,
{
    pub fn new(repository: R, transport: T, dispatcher: EventDispatcher<Rt>) -> Self {
        Self {
            repository,
            transport,
            dispatcher,
            _aggregate: PhantomData,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn dispatcher(&self) -> &EventDispatcher<Rt> {
        &self.dispatcher
    }

    /// Loads an aggregate that must exist.
    pub async fn load(&self, id: AggregateId) -> Result<A> {
        Ok(self.repository.get(id).await?)
    }

    /// Saves the aggregate with its pending events.
    #[tracing::instrument(
        skip(self, aggregate),
        fields(aggregate_type = A::aggregate_type(), aggregate_id = %aggregate.id())
    )]
    pub async fn commit(&self, aggregate: &A, options: SaveOptions) -> Result<Version> {
        let version = self.repository.save(aggregate, options).await?;
        tracing::debug!(
            %version,
            pending_events = aggregate.pending_events().len(),
            "aggregate committed"
        );
        Ok(version)
    }

    /// Sends the committed aggregate's pending events, then saves the
    /// cleared buffer.
    ///
    /// Clearing is not a mutation, so the version stays the same. On a
    /// transport failure nothing is cleared and the stored record keeps
    /// every event. If another writer committed a newer version in the
    /// meantime, the cleared buffer is not saved and the dispatch still
    /// succeeds; the newer record re-sends the events (at-least-once).
    #[tracing::instrument(
        skip(self, aggregate),
        fields(aggregate_type = A::aggregate_type(), aggregate_id = %aggregate.id())
    )]
    pub async fn dispatch(&self, aggregate: &mut A) -> Result<DispatchReport> {
        if aggregate.pending_events().is_empty() {
            return Ok(DispatchReport::default());
        }

        let report = self
            .dispatcher
            .dispatch_and_clear(aggregate, &self.transport)
            .await?;

        match self
            .repository
            .save(aggregate, SaveOptions::expect_version(aggregate.version()))
            .await
        {
            Ok(_) => {}
            // A newer record was committed meanwhile. It still carries these
            // events, so they are sent again when that writer dispatches.
            Err(RepositoryError::ConcurrencyConflict { expected, actual, .. }) => {
                tracing::warn!(
                    %expected,
                    %actual,
                    "cleared buffer not saved: aggregate was committed by another writer"
                );
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(events = report.len(), "domain events dispatched");
        Ok(report)
    }

    /// Commits the aggregate, then dispatches its events.
    ///
    /// A `Transport` error here means the commit succeeded.
    pub async fn commit_and_dispatch(
        &self,
        aggregate: &mut A,
        options: SaveOptions,
    ) -> Result<DispatchReport> {
        self.commit(aggregate, options).await?;
        self.dispatch(aggregate).await
    }

    /// Retries dispatch for whatever a stored aggregate still has buffered.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub async fn redispatch(&self, id: AggregateId) -> Result<DispatchReport> {
        let mut aggregate = self.load(id).await?;
        let pending = aggregate.pending_events().len();
        if pending > 0 {
            tracing::info!(pending, "redispatching buffered events");
        }
        self.dispatch(&mut aggregate).await
    }
}
