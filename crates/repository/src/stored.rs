use chrono::{DateTime, Utc};
use common::{AggregateId, Version};
use domain::Aggregate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// The persisted form of an aggregate.
///
/// The JSON state includes the aggregate's pending-event buffer, so events
/// committed but not yet published survive a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAggregate {
    /// The aggregate this record belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g., "Claim").
    pub aggregate_type: String,

    /// The aggregate version at the time of the save.
    pub version: Version,

    /// Number of unpublished events in the stored state.
    pub pending_events: usize,

    /// When the record was written.
    pub saved_at: DateTime<Utc>,

    /// The serialized aggregate state.
    pub state: serde_json::Value,
}

impl StoredAggregate {
    /// Captures the current state of `aggregate`.
    pub fn from_aggregate<A>(aggregate: &A) -> Result<Self, serde_json::Error>
    where
        A: Aggregate + Serialize,
    {
        let root = aggregate.root();
        Ok(Self {
            aggregate_id: root.id(),
            aggregate_type: A::aggregate_type().to_string(),
            version: root.version(),
            pending_events: root.pending_events().len(),
            saved_at: Utc::now(),
            state: serde_json::to_value(aggregate)?,
        })
    }

    /// Deserializes the stored state back into an aggregate.
    pub fn into_aggregate<A: DeserializeOwned>(self) -> Result<A, serde_json::Error> {
        serde_json::from_value(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{Claim, ClaimSubmission, CustomerId, HasPendingEvents, Money, Mutable};

    fn claim() -> Claim {
        Claim::submit(ClaimSubmission::new(
            "POL-1",
            CustomerId::new(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            "Hail damage to roof",
            Money::from_dollars(800),
        ))
        .unwrap()
    }

    #[test]
    fn record_describes_aggregate() {
        let claim = claim();
        let stored = StoredAggregate::from_aggregate(&claim).unwrap();

        assert_eq!(stored.aggregate_id, claim.id());
        assert_eq!(stored.aggregate_type, "Claim");
        assert_eq!(stored.version, Version::first());
        assert_eq!(stored.pending_events, 1);
    }

    #[test]
    fn into_aggregate_restores_buffer() {
        let claim = claim();
        let stored = StoredAggregate::from_aggregate(&claim).unwrap();

        let restored: Claim = stored.into_aggregate().unwrap();
        assert_eq!(restored, claim);
        assert_eq!(restored.version(), claim.version());
        assert_eq!(restored.pending_events().len(), 1);
    }
}
