//! In-memory transport for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use common::EventId;
use domain::DomainEvent;

use crate::transport::{Delivery, Transport, TransportError};

/// A message accepted by [`InMemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub destination: String,
    pub key: String,
    pub event_id: EventId,
    pub event_type: String,
    /// The event as it would appear on the wire.
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    sent: Vec<SentMessage>,
    offsets: HashMap<String, i64>,
    attempts: usize,
    fail_always: Option<TransportError>,
    fail_on_attempt: Option<(usize, TransportError)>,
}

/// Transport that records messages instead of sending them.
///
/// Clones share the same recorded state, so a test can hand one clone to
/// the code under test and inspect another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<InMemoryTransportState>>,
    latency: Option<Duration>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every send by `latency` before it is recorded.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every following send fail with `error`.
    pub fn fail_always(&self, error: TransportError) {
        self.state().fail_always = Some(error);
    }

    /// Makes the `n`-th send attempt from now (1-based) fail with `error`.
    pub fn fail_on_send(&self, n: usize, error: TransportError) {
        let mut state = self.state();
        let attempt = state.attempts + n.max(1);
        state.fail_on_attempt = Some((attempt, error));
    }

    /// Removes any configured failures.
    pub fn recover(&self) {
        let mut state = self.state();
        state.fail_always = None;
        state.fail_on_attempt = None;
    }

    /// Returns every accepted message, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state().sent.clone()
    }

    /// Returns the accepted messages for one destination.
    pub fn sent_to(&self, destination: &str) -> Vec<SentMessage> {
        self.state()
            .sent
            .iter()
            .filter(|m| m.destination == destination)
            .cloned()
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.state().sent.len()
    }

    /// Returns the number of sends attempted, failed ones included.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    /// Forgets recorded messages and attempts. Failure settings are kept.
    pub fn clear(&self) {
        let mut state = self.state();
        state.sent.clear();
        state.offsets.clear();
        state.attempts = 0;
    }

    fn state(&self) -> MutexGuard<'_, InMemoryTransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<E: DomainEvent> Transport<E> for InMemoryTransport {
    async fn send(
        &self,
        destination: &str,
        key: &str,
        event: &E,
    ) -> Result<Delivery, TransportError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let payload = serde_json::to_value(event)
            .map_err(|e| TransportError::NonRetryable(format!("unserializable event: {e}")))?;

        let mut state = self.state();
        state.attempts += 1;

        if let Some(error) = &state.fail_always {
            return Err(error.clone());
        }
        if let Some((attempt, error)) = &state.fail_on_attempt {
            if *attempt == state.attempts {
                let error = error.clone();
                state.fail_on_attempt = None;
                return Err(error);
            }
        }

        let offset = state.offsets.entry(destination.to_string()).or_insert(0);
        let delivery = Delivery::at(0, *offset);
        *offset += 1;

        state.sent.push(SentMessage {
            destination: destination.to_string(),
            key: key.to_string(),
            event_id: event.event_id(),
            event_type: event.event_type().to_string(),
            payload,
        });

        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::EventMetadata;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Pinged {
        metadata: EventMetadata,
        note: String,
    }

    impl DomainEvent for Pinged {
        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    fn ping(note: &str) -> Pinged {
        Pinged {
            metadata: EventMetadata::new("Pinged", "1.0"),
            note: note.to_string(),
        }
    }

    #[tokio::test]
    async fn records_messages_with_payload() {
        let transport = InMemoryTransport::new();
        let event = ping("hello");
        let key = event.event_id().to_string();

        let delivery = transport.send("domain-events", &key, &event).await.unwrap();

        assert_eq!(delivery, Delivery::at(0, 0));
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].key, key);
        assert_eq!(sent[0].event_type, "Pinged");
        assert_eq!(sent[0].payload["note"], "hello");
    }

    #[tokio::test]
    async fn offsets_are_per_destination() {
        let transport = InMemoryTransport::new();

        let a = transport.send("a", "k", &ping("1")).await.unwrap();
        let b = transport.send("b", "k", &ping("2")).await.unwrap();
        let a2 = transport.send("a", "k", &ping("3")).await.unwrap();

        assert_eq!(a.offset, Some(0));
        assert_eq!(b.offset, Some(0));
        assert_eq!(a2.offset, Some(1));
        assert_eq!(transport.sent_to("a").len(), 2);
    }

    #[tokio::test]
    async fn fail_on_send_fails_once() {
        let transport = InMemoryTransport::new();
        transport.fail_on_send(2, TransportError::NonRetryable("rejected".into()));

        assert!(transport.send("t", "k", &ping("1")).await.is_ok());
        assert_eq!(
            transport.send("t", "k", &ping("2")).await.unwrap_err(),
            TransportError::NonRetryable("rejected".into())
        );
        assert!(transport.send("t", "k", &ping("3")).await.is_ok());

        assert_eq!(transport.attempts(), 3);
        assert_eq!(transport.sent_count(), 2);
    }

    #[tokio::test]
    async fn fail_always_until_recovered() {
        let transport = InMemoryTransport::new();
        transport.fail_always(TransportError::Retryable("broker down".into()));

        assert!(transport.send("t", "k", &ping("1")).await.is_err());
        assert!(transport.send("t", "k", &ping("2")).await.is_err());

        transport.recover();
        assert!(transport.send("t", "k", &ping("3")).await.is_ok());
        assert_eq!(transport.sent_count(), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let transport = InMemoryTransport::new();
        let observer = transport.clone();

        transport.send("t", "k", &ping("1")).await.unwrap();
        assert_eq!(observer.sent_count(), 1);

        observer.clear();
        assert_eq!(transport.attempts(), 0);
    }
}
