//! Dispatch integration tests
//!
//! Drive the dispatcher with the claim aggregate and the in-memory
//! transport, checking what would reach the broker.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use domain::{Aggregate, Claim, ClaimSubmission, CustomerId, DomainEvent, HasPendingEvents, Money};
use messaging::{
    DispatchError, DispatcherConfig, EventDispatcher, InMemoryTransport, Transport, TransportError,
};

fn reviewed_claim() -> Claim {
    let mut claim = Claim::submit(ClaimSubmission::new(
        "POL-42",
        CustomerId::new(),
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        "Kitchen fire",
        Money::from_dollars(12_000),
    ))
    .unwrap();
    claim.start_review("adjuster-9").unwrap();
    claim
}

#[tokio::test]
async fn claim_events_reach_the_broker_keyed_by_event_id() {
    let mut claim = reviewed_claim();
    let pending: Vec<_> = claim
        .pending_events()
        .iter()
        .map(|e| (e.event_id(), e.event_type().to_string()))
        .collect();

    let transport = InMemoryTransport::new();
    EventDispatcher::new()
        .dispatch_and_clear(&mut claim, &transport)
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    for (message, (event_id, event_type)) in sent.iter().zip(&pending) {
        assert_eq!(message.destination, "domain-events");
        assert_eq!(message.key, event_id.to_string());
        assert_eq!(&message.event_type, event_type);
        assert_eq!(message.payload["type"], event_type.as_str());
        assert_eq!(message.payload["data"]["claim_id"], claim.id().to_string());
    }
}

#[tokio::test]
async fn configured_routes_apply_per_event_type() {
    let config = DispatcherConfig::from_lookup(|key| match key {
        "EVENTS_TOPIC_ROUTES" => Some("ReviewStarted=claims.reviews".to_string()),
        _ => None,
    });
    let dispatcher = EventDispatcher::from_config(&config);

    let mut claim = reviewed_claim();
    let transport = InMemoryTransport::new();
    dispatcher
        .dispatch_and_clear(&mut claim, &transport)
        .await
        .unwrap();

    assert_eq!(transport.sent_to("domain-events").len(), 1);
    let reviews = transport.sent_to("claims.reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].event_type, "ReviewStarted");
}

#[tokio::test]
async fn broker_outage_keeps_events_for_retry() {
    let mut claim = reviewed_claim();
    let transport = InMemoryTransport::new();
    transport.fail_always(TransportError::Retryable("no brokers available".into()));

    let dispatcher = EventDispatcher::new();
    let err = dispatcher
        .dispatch_and_clear(&mut claim, &transport)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(err.sent_event_ids().is_empty());
    assert_eq!(claim.pending_events().len(), 2);

    transport.recover();
    let report = dispatcher
        .dispatch_and_clear(&mut claim, &transport)
        .await
        .unwrap();
    assert_eq!(report.len(), 2);
    assert!(claim.pending_events().is_empty());
}

#[tokio::test]
async fn shared_transport_behind_trait_object() {
    let transport = InMemoryTransport::new();
    let shared: Arc<dyn Transport<domain::ClaimEvent>> = Arc::new(transport.clone());

    let mut claim = reviewed_claim();
    EventDispatcher::new()
        .dispatch_and_clear(&mut claim, &shared)
        .await
        .unwrap();

    assert_eq!(transport.sent_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_broker_times_out_whole_batch() {
    let mut claim = reviewed_claim();
    let transport = InMemoryTransport::new().with_latency(Duration::from_secs(2));
    let dispatcher = EventDispatcher::new().with_timeout(Duration::from_secs(1));

    let err = dispatcher
        .dispatch_and_clear(&mut claim, &transport)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::TimedOut { unsent: 2, timeout, .. } if timeout == Duration::from_secs(1)
    ));
    assert_eq!(claim.pending_events().len(), 2);
    assert_eq!(transport.sent_count(), 0);
}
