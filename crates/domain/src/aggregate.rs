//! Aggregate root state and the capability traits built on it.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use common::{AggregateId, Clock, SystemClock, Version};
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Identity, version, timestamps and the pending-event buffer shared by
/// every aggregate.
///
/// Concrete aggregates embed one of these and expose it through
/// [`Aggregate::root`]. Pending events are serialized with the rest of the
/// state so a persisted aggregate keeps its unpublished events.
///
/// Two roots are equal when their IDs are equal, whatever their version,
/// timestamps or buffered events.
///
/// Instances are not synchronized: a single writer per instance is assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "E: Deserialize<'de>"))]
pub struct AggregateRoot<E> {
    id: AggregateId,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    pending_events: Vec<E>,
}

impl<E> AggregateRoot<E> {
    /// Creates a root with a generated ID.
    pub fn new() -> Self {
        Self::with_id(AggregateId::new())
    }

    /// Creates a root with a caller-supplied ID.
    pub fn with_id(id: AggregateId) -> Self {
        Self::with_clock(id, &SystemClock)
    }

    /// Creates a root whose timestamps come from `clock`.
    pub fn with_clock(id: AggregateId, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id,
            version: Version::initial(),
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> AggregateId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Appends an event to the pending buffer.
    pub fn register_event(&mut self, event: E) {
        self.pending_events.push(event);
    }

    /// Records one logical state change: bumps the version by one and
    /// refreshes `updated_at`.
    pub fn mark_mutated(&mut self) {
        self.mark_mutated_with(&SystemClock);
    }

    /// Like [`mark_mutated`](Self::mark_mutated) with an explicit clock.
    ///
    /// `updated_at` never moves backwards, so it stays `>= created_at`
    /// even if the clock does.
    pub fn mark_mutated_with(&mut self, clock: &dyn Clock) {
        self.version = self.version.next();
        self.updated_at = clock.now().max(self.updated_at);
    }

    /// Events registered since the last clear, in registration order.
    pub fn pending_events(&self) -> &[E] {
        &self.pending_events
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Drops every pending event. A no-op on an empty buffer.
    ///
    /// Only call this once the events have been handed to the transport.
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

impl<E> Default for AggregateRoot<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PartialEq for AggregateRoot<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for AggregateRoot<E> {}

impl<E> Hash for AggregateRoot<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Read access to an aggregate's unpublished events, and the clear that
/// follows a confirmed publish.
pub trait HasPendingEvents {
    type Event: DomainEvent;

    /// Returns the events waiting to be published, oldest first.
    fn pending_events(&self) -> &[Self::Event];

    /// Empties the buffer.
    fn clear_events(&mut self);
}

/// Version bookkeeping for state-changing operations.
pub trait Mutable {
    /// Returns the current version.
    fn version(&self) -> Version;

    /// Marks one committed mutation.
    fn mark_mutated(&mut self);
}

/// Trait for aggregates built on an embedded [`AggregateRoot`].
///
/// Implementors get [`HasPendingEvents`] and [`Mutable`] for free.
pub trait Aggregate: Send + Sync {
    /// The type of events this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    ///
    /// Used for persistence records and log fields.
    fn aggregate_type() -> &'static str;

    /// Returns the embedded root.
    fn root(&self) -> &AggregateRoot<Self::Event>;

    /// Returns the embedded root mutably.
    fn root_mut(&mut self) -> &mut AggregateRoot<Self::Event>;

    fn id(&self) -> AggregateId {
        self.root().id()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.root().created_at()
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.root().updated_at()
    }
}

impl<A: Aggregate> HasPendingEvents for A {
    type Event = A::Event;

    fn pending_events(&self) -> &[Self::Event] {
        self.root().pending_events()
    }

    fn clear_events(&mut self) {
        self.root_mut().clear_events();
    }
}

impl<A: Aggregate> Mutable for A {
    fn version(&self) -> Version {
        self.root().version()
    }

    fn mark_mutated(&mut self) {
        self.root_mut().mark_mutated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMetadata;
    use chrono::{Duration, TimeZone};
    use common::FixedClock;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Noted {
        metadata: EventMetadata,
        note: String,
    }

    impl Noted {
        fn new(note: &str) -> Self {
            Self {
                metadata: EventMetadata::new("Noted", "1.0"),
                note: note.to_string(),
            }
        }
    }

    impl DomainEvent for Noted {
        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Notebook {
        root: AggregateRoot<Noted>,
        notes: Vec<String>,
    }

    impl Notebook {
        fn write(&mut self, note: &str) {
            self.notes.push(note.to_string());
            self.root.register_event(Noted::new(note));
            self.root.mark_mutated();
        }
    }

    impl Aggregate for Notebook {
        type Event = Noted;

        fn aggregate_type() -> &'static str {
            "Notebook"
        }

        fn root(&self) -> &AggregateRoot<Noted> {
            &self.root
        }

        fn root_mut(&mut self) -> &mut AggregateRoot<Noted> {
            &mut self.root
        }
    }

    fn notebook() -> Notebook {
        Notebook {
            root: AggregateRoot::new(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn new_root_starts_at_initial_version_with_empty_buffer() {
        let root: AggregateRoot<Noted> = AggregateRoot::new();
        assert_eq!(root.version(), Version::initial());
        assert!(root.pending_events().is_empty());
        assert_eq!(root.created_at(), root.updated_at());
    }

    #[test]
    fn with_id_keeps_caller_supplied_id() {
        let id = AggregateId::new();
        let root: AggregateRoot<Noted> = AggregateRoot::with_id(id);
        assert_eq!(root.id(), id);
    }

    #[test]
    fn version_increments_once_per_mark_mutated() {
        let mut root: AggregateRoot<Noted> = AggregateRoot::new();
        for expected in 1..=25 {
            root.mark_mutated();
            assert_eq!(root.version(), Version::new(expected));
        }
    }

    #[test]
    fn mark_mutated_refreshes_updated_at() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = start + Duration::minutes(5);
        let mut root: AggregateRoot<Noted> =
            AggregateRoot::with_clock(AggregateId::new(), &FixedClock(start));

        root.mark_mutated_with(&FixedClock(later));

        assert_eq!(root.created_at(), start);
        assert_eq!(root.updated_at(), later);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let earlier = start - Duration::hours(1);
        let mut root: AggregateRoot<Noted> =
            AggregateRoot::with_clock(AggregateId::new(), &FixedClock(start));

        root.mark_mutated_with(&FixedClock(earlier));

        assert_eq!(root.version(), Version::first());
        assert!(root.updated_at() >= root.created_at());
    }

    #[test]
    fn pending_events_keep_registration_order() {
        let mut root = AggregateRoot::new();
        let events = [Noted::new("e1"), Noted::new("e2"), Noted::new("e3")];
        for event in events.iter().cloned() {
            root.register_event(event);
        }

        let ids: Vec<_> = root.pending_events().iter().map(|e| e.event_id()).collect();
        let expected: Vec<_> = events.iter().map(|e| e.event_id()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn register_event_does_not_touch_version() {
        let mut root = AggregateRoot::new();
        root.register_event(Noted::new("e1"));
        assert_eq!(root.version(), Version::initial());
        assert!(root.has_pending_events());
    }

    #[test]
    fn clear_events_empties_buffer() {
        let mut root = AggregateRoot::new();
        root.register_event(Noted::new("e1"));
        root.register_event(Noted::new("e2"));

        root.clear_events();

        assert!(root.pending_events().is_empty());
    }

    #[test]
    fn clear_events_on_empty_buffer_is_noop() {
        let mut root: AggregateRoot<Noted> = AggregateRoot::new();
        root.clear_events();
        root.clear_events();
        assert!(root.pending_events().is_empty());
        assert_eq!(root.version(), Version::initial());
    }

    #[test]
    fn roots_with_same_id_are_equal() {
        let id = AggregateId::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a: AggregateRoot<Noted> = AggregateRoot::with_clock(id, &FixedClock(start));
        let mut b: AggregateRoot<Noted> =
            AggregateRoot::with_clock(id, &FixedClock(start + Duration::days(3)));
        b.mark_mutated();
        b.register_event(Noted::new("only on b"));

        assert_eq!(a, b);
    }

    #[test]
    fn roots_with_different_ids_are_not_equal() {
        let at = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let a: AggregateRoot<Noted> = AggregateRoot::with_clock(AggregateId::new(), &at);
        let b: AggregateRoot<Noted> = AggregateRoot::with_clock(AggregateId::new(), &at);
        assert_ne!(a, b);
    }

    #[test]
    fn equal_roots_hash_alike() {
        use std::collections::HashSet;

        let id = AggregateId::new();
        let a: AggregateRoot<Noted> = AggregateRoot::with_id(id);
        let mut b: AggregateRoot<Noted> = AggregateRoot::with_id(id);
        b.mark_mutated();

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn aggregate_gets_capability_traits() {
        let mut book = notebook();
        book.write("first");
        book.write("second");

        assert_eq!(Mutable::version(&book), Version::new(2));
        assert_eq!(HasPendingEvents::pending_events(&book).len(), 2);
        assert_eq!(book.notes, vec!["first", "second"]);

        HasPendingEvents::clear_events(&mut book);
        assert!(HasPendingEvents::pending_events(&book).is_empty());
        assert_eq!(Mutable::version(&book), Version::new(2));
    }

    #[test]
    fn pending_events_survive_serialization() {
        let mut book = notebook();
        book.write("persist me");

        let json = serde_json::to_string(&book).unwrap();
        let restored: Notebook = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id(), book.id());
        assert_eq!(restored.root.version(), Version::first());
        assert_eq!(restored.root.pending_events().len(), 1);
        assert_eq!(restored.root.pending_events()[0].note, "persist me");
        assert_eq!(
            restored.root.pending_events()[0].event_id(),
            book.root.pending_events()[0].event_id()
        );
    }

    #[test]
    fn record_without_buffer_field_loads_empty() {
        let root: AggregateRoot<Noted> = AggregateRoot::new();
        let mut json = serde_json::to_value(&root).unwrap();
        json.as_object_mut().unwrap().remove("pending_events");

        let restored: AggregateRoot<Noted> = serde_json::from_value(json).unwrap();
        assert_eq!(restored.id(), root.id());
        assert!(restored.pending_events().is_empty());
    }
}
