//! Destination selection for outgoing events.

use std::collections::HashMap;

/// Topic used when no routing override applies.
pub const DEFAULT_TOPIC: &str = "domain-events";

/// Chooses the destination topic for an event from its type tag.
pub trait RoutingRule: Send + Sync {
    fn destination(&self, event_type: &str) -> String;
}

/// Sends every event to a single topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTopic(String);

impl DefaultTopic {
    pub fn new(topic: impl Into<String>) -> Self {
        Self(topic.into())
    }

    pub fn topic(&self) -> &str {
        &self.0
    }
}

impl Default for DefaultTopic {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC)
    }
}

impl RoutingRule for DefaultTopic {
    fn destination(&self, _event_type: &str) -> String {
        self.0.clone()
    }
}

/// Per-event-type topic overrides with a fallback topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicMap {
    fallback: DefaultTopic,
    routes: HashMap<String, String>,
}

impl TopicMap {
    /// Creates a map that sends everything to `fallback` until routes are added.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: DefaultTopic::new(fallback),
            routes: HashMap::new(),
        }
    }

    /// Adds an override for one event type.
    pub fn route(mut self, event_type: impl Into<String>, topic: impl Into<String>) -> Self {
        self.routes.insert(event_type.into(), topic.into());
        self
    }

    pub fn fallback(&self) -> &str {
        self.fallback.topic()
    }

    pub fn routes(&self) -> &HashMap<String, String> {
        &self.routes
    }
}

impl RoutingRule for TopicMap {
    fn destination(&self, event_type: &str) -> String {
        match self.routes.get(event_type) {
            Some(topic) => topic.clone(),
            None => self.fallback.destination(event_type),
        }
    }
}

impl<F> RoutingRule for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn destination(&self, event_type: &str) -> String {
        self(event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topic_is_domain_events() {
        let rule = DefaultTopic::default();
        assert_eq!(rule.destination("ClaimSubmitted"), "domain-events");
        assert_eq!(rule.destination("anything"), "domain-events");
    }

    #[test]
    fn topic_map_overrides_by_event_type() {
        let rule = TopicMap::default()
            .route("ClaimPaid", "payments")
            .route("ClaimRejected", "claims.rejections");

        assert_eq!(rule.destination("ClaimPaid"), "payments");
        assert_eq!(rule.destination("ClaimRejected"), "claims.rejections");
        assert_eq!(rule.destination("ClaimSubmitted"), DEFAULT_TOPIC);
    }

    #[test]
    fn topic_map_custom_fallback() {
        let rule = TopicMap::new("claims");
        assert_eq!(rule.fallback(), "claims");
        assert_eq!(rule.destination("ReviewStarted"), "claims");
    }

    #[test]
    fn closures_are_routing_rules() {
        let rule = |event_type: &str| format!("claims.{}", event_type.to_lowercase());
        assert_eq!(rule.destination("ClaimPaid"), "claims.claimpaid");
    }
}
