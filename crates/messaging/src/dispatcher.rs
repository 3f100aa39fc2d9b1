//! Draining an aggregate's pending events through a transport.

use std::time::{Duration, Instant};

use common::EventId;
use domain::{DomainEvent, HasPendingEvents};
use tokio::sync::Mutex;

use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use crate::routing::{DefaultTopic, RoutingRule, TopicMap};
use crate::transport::{Delivery, Transport};

/// Outcome of one acknowledged send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDelivery {
    pub event_id: EventId,
    pub event_type: String,
    pub destination: String,
    pub delivery: Delivery,
}

/// Result of a fully successful dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Per-event receipts, in send order.
    pub deliveries: Vec<EventDelivery>,
}

impl DispatchReport {
    pub fn sent_event_ids(&self) -> Vec<EventId> {
        self.deliveries.iter().map(|d| d.event_id).collect()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

/// Publishes an aggregate's pending events and clears them on success.
///
/// Events are sent one at a time in buffer order, each to the destination
/// chosen by the routing rule and keyed by its event id. The first failed
/// send stops the batch, so no event is ever delivered ahead of an earlier
/// one that failed.
#[derive(Debug, Clone)]
pub struct EventDispatcher<R = DefaultTopic> {
    routing: R,
    timeout: Option<Duration>,
}

impl EventDispatcher<DefaultTopic> {
    /// Creates a dispatcher that sends everything to `"domain-events"`.
    pub fn new() -> Self {
        Self::with_routing(DefaultTopic::default())
    }
}

impl Default for EventDispatcher<DefaultTopic> {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher<TopicMap> {
    /// Creates a dispatcher from environment-derived settings.
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            routing: config.routing(),
            timeout: config.timeout,
        }
    }
}

impl<R: RoutingRule> EventDispatcher<R> {
    pub fn with_routing(routing: R) -> Self {
        Self {
            routing,
            timeout: None,
        }
    }

    /// Bounds the whole batch by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the topic an event will be sent to.
    pub fn destination_for<E: DomainEvent>(&self, event: &E) -> String {
        self.routing.destination(event.event_type())
    }

    /// Sends every pending event, then clears the buffer.
    ///
    /// On any failure the buffer is left exactly as it was and the error
    /// lists the events that were acknowledged before the failure.
    pub async fn dispatch_and_clear<A, T>(
        &self,
        aggregate: &mut A,
        transport: &T,
    ) -> Result<DispatchReport>
    where
        A: HasPendingEvents,
        T: Transport<A::Event> + ?Sized,
    {
        let events = aggregate.pending_events();
        if events.is_empty() {
            tracing::debug!("no pending events to dispatch");
            return Ok(DispatchReport::default());
        }

        let started = Instant::now();
        let outcome = self.send_all(events, transport).await;
        metrics::histogram!("domain_event_dispatch_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(deliveries) => {
                aggregate.clear_events();
                metrics::counter!("domain_event_batches_total", "outcome" => "success")
                    .increment(1);
                Ok(DispatchReport { deliveries })
            }
            Err(err) => {
                metrics::counter!("domain_event_batches_total", "outcome" => "failure")
                    .increment(1);
                Err(err)
            }
        }
    }

    /// Dispatches a shared aggregate, holding its lock for the whole batch.
    pub async fn dispatch_locked<A, T>(
        &self,
        aggregate: &Mutex<A>,
        transport: &T,
    ) -> Result<DispatchReport>
    where
        A: HasPendingEvents,
        T: Transport<A::Event> + ?Sized,
    {
        let mut guard = aggregate.lock().await;
        self.dispatch_and_clear(&mut *guard, transport).await
    }

    async fn send_all<E, T>(&self, events: &[E], transport: &T) -> Result<Vec<EventDelivery>>
    where
        E: DomainEvent,
        T: Transport<E> + ?Sized,
    {
        let deadline = self
            .timeout
            .map(|timeout| (tokio::time::Instant::now() + timeout, timeout));
        let mut deliveries: Vec<EventDelivery> = Vec::with_capacity(events.len());

        for event in events {
            let event_id = event.event_id();
            let event_type = event.event_type();
            let destination = self.destination_for(event);
            let key = event_id.to_string();

            tracing::info!(
                event_type,
                %event_id,
                topic = %destination,
                "Publishing event"
            );

            let send = transport.send(&destination, &key, event);
            let result = match deadline {
                Some((at, timeout)) => match tokio::time::timeout_at(at, send).await {
                    Ok(result) => result,
                    Err(_) => {
                        let sent = sent_ids(&deliveries);
                        let unsent = events.len() - sent.len();
                        metrics::counter!("domain_event_dispatch_failures_total", "reason" => "timeout")
                            .increment(1);
                        tracing::error!(
                            %event_id,
                            topic = %destination,
                            ?timeout,
                            unsent,
                            "Dispatch timed out"
                        );
                        return Err(DispatchError::TimedOut {
                            sent,
                            unsent,
                            timeout,
                        });
                    }
                },
                None => send.await,
            };

            match result {
                Ok(delivery) => {
                    tracing::info!(
                        topic = %destination,
                        offset = ?delivery.offset,
                        "Event published successfully"
                    );
                    metrics::counter!("domain_events_dispatched_total", "topic" => destination.clone())
                        .increment(1);
                    deliveries.push(EventDelivery {
                        event_id,
                        event_type: event_type.to_string(),
                        destination,
                        delivery,
                    });
                }
                Err(source) => {
                    metrics::counter!("domain_event_dispatch_failures_total", "reason" => "transport")
                        .increment(1);
                    tracing::error!(
                        %event_id,
                        topic = %destination,
                        error = %source,
                        "Failed to publish event"
                    );
                    return Err(DispatchError::Transport {
                        event_id,
                        destination,
                        sent: sent_ids(&deliveries),
                        source,
                    });
                }
            }
        }

        Ok(deliveries)
    }
}

fn sent_ids(deliveries: &[EventDelivery]) -> Vec<EventId> {
    deliveries.iter().map(|d| d.event_id).collect()
}
