//! Domain event trait and the metadata every event carries.

use chrono::{DateTime, Utc};
use common::{Clock, EventId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Identity, timestamp and type information attached to every domain event.
///
/// Assigned once when the event is created and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    event_id: EventId,
    occurred_at: DateTime<Utc>,
    event_type: String,
    schema_version: String,
}

impl EventMetadata {
    /// Creates metadata with a fresh event ID and the current time.
    pub fn new(event_type: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self::restore(
            EventId::new(),
            Utc::now(),
            event_type.into(),
            schema_version.into(),
        )
    }

    /// Creates metadata with a fresh event ID, timestamped by `clock`.
    pub fn with_clock(
        clock: &dyn Clock,
        event_type: impl Into<String>,
        schema_version: impl Into<String>,
    ) -> Self {
        Self::restore(
            EventId::new(),
            clock.now(),
            event_type.into(),
            schema_version.into(),
        )
    }

    /// Rebuilds metadata from previously stored values.
    pub fn restore(
        event_id: EventId,
        occurred_at: DateTime<Utc>,
        event_type: impl Into<String>,
        schema_version: impl Into<String>,
    ) -> Self {
        Self {
            event_id,
            occurred_at,
            event_type: event_type.into(),
            schema_version: schema_version.into(),
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }
}

/// Trait for domain events.
///
/// Domain events represent facts that have happened to an aggregate.
/// They are immutable and should be named in past tense. The event type
/// tag comes from the concrete event definition, so it stays stable even
/// if Rust type names change.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync + std::fmt::Debug {
    /// Returns the metadata assigned when the event was created.
    fn metadata(&self) -> &EventMetadata;

    /// Globally unique identifier of this event.
    fn event_id(&self) -> EventId {
        self.metadata().event_id()
    }

    /// When the event happened.
    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at()
    }

    /// Stable tag naming the kind of event (e.g. `"ClaimSubmitted"`).
    fn event_type(&self) -> &str {
        self.metadata().event_type()
    }

    /// Schema version used by consumers for compatibility decisions.
    ///
    /// Not interpreted by this crate.
    fn schema_version(&self) -> &str {
        self.metadata().schema_version()
    }
}
