use std::sync::Arc;

use async_trait::async_trait;
use domain::DomainEvent;
use thiserror::Error;

/// Receipt for a message accepted by a transport.
///
/// Brokers that assign positions report them here; transports without a
/// notion of partitions leave both fields empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub partition: Option<i32>,
    pub offset: Option<i64>,
}

impl Delivery {
    /// A receipt with a known partition and offset.
    pub fn at(partition: i32, offset: i64) -> Self {
        Self {
            partition: Some(partition),
            offset: Some(offset),
        }
    }
}

/// Errors reported by a transport for a single send.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The broker may accept the message if it is sent again.
    #[error("Transport error (retryable): {0}")]
    Retryable(String),

    /// Sending the same message again will fail the same way.
    #[error("Transport error: {0}")]
    NonRetryable(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Retryable(_))
    }
}

/// A message broker that accepts domain events.
///
/// `send` resolves once the broker has acknowledged the message, so a
/// successful return means the event has left the process.
#[async_trait]
pub trait Transport<E: DomainEvent>: Send + Sync {
    /// Sends one event to `destination`, partitioned by `key`.
    async fn send(
        &self,
        destination: &str,
        key: &str,
        event: &E,
    ) -> Result<Delivery, TransportError>;
}

#[async_trait]
impl<E, T> Transport<E> for Arc<T>
where
    E: DomainEvent,
    T: Transport<E> + ?Sized,
{
    async fn send(
        &self,
        destination: &str,
        key: &str,
        event: &E,
    ) -> Result<Delivery, TransportError> {
        (**self).send(destination, key, event).await
    }
}
