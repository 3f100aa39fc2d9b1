use std::time::Duration;

use common::EventId;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors that stop a dispatch batch.
///
/// Any error leaves the aggregate's buffer untouched. `sent` lists the
/// events the broker acknowledged before the failure; they will be sent
/// again on the next attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport rejected an event.
    #[error("Failed to publish event {event_id} to topic {destination}: {source}")]
    Transport {
        event_id: EventId,
        destination: String,
        sent: Vec<EventId>,
        #[source]
        source: TransportError,
    },

    /// The batch deadline passed before every event was acknowledged.
    #[error("Dispatch timed out after {timeout:?} with {unsent} event(s) unsent")]
    TimedOut {
        sent: Vec<EventId>,
        unsent: usize,
        timeout: Duration,
    },
}

impl DispatchError {
    /// Returns the events the broker acknowledged before the batch failed.
    pub fn sent_event_ids(&self) -> &[EventId] {
        match self {
            DispatchError::Transport { sent, .. } | DispatchError::TimedOut { sent, .. } => sent,
        }
    }

    /// Returns true if retrying the whole batch may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Transport { source, .. } => source.is_retryable(),
            DispatchError::TimedOut { .. } => true,
        }
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
