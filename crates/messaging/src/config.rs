//! Dispatcher configuration loaded from environment variables.

use std::collections::HashMap;
use std::time::Duration;

use crate::routing::{DEFAULT_TOPIC, TopicMap};

/// Event dispatch settings.
///
/// Reads from environment variables:
/// - `EVENTS_DEFAULT_TOPIC`: fallback topic (default: `"domain-events"`)
/// - `EVENTS_DISPATCH_TIMEOUT_MS`: batch deadline in milliseconds (default: none)
/// - `EVENTS_TOPIC_ROUTES`: per-event-type overrides, `Type=topic,Type2=topic2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub default_topic: String,
    pub timeout: Option<Duration>,
    pub topic_routes: HashMap<String, String>,
}

impl DispatcherConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_topic = lookup("EVENTS_DEFAULT_TOPIC")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let timeout = lookup("EVENTS_DISPATCH_TIMEOUT_MS")
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        let topic_routes = lookup("EVENTS_TOPIC_ROUTES")
            .map(|routes| parse_routes(&routes))
            .unwrap_or_default();

        Self {
            default_topic,
            timeout,
            topic_routes,
        }
    }

    /// Builds the routing rule these settings describe.
    pub fn routing(&self) -> TopicMap {
        self.topic_routes
            .iter()
            .fold(TopicMap::new(self.default_topic.clone()), |map, (event_type, topic)| {
                map.route(event_type.clone(), topic.clone())
            })
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_topic: DEFAULT_TOPIC.to_string(),
            timeout: None,
            topic_routes: HashMap::new(),
        }
    }
}

// Malformed pairs are skipped.
fn parse_routes(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (event_type, topic) = pair.split_once('=')?;
            let (event_type, topic) = (event_type.trim(), topic.trim());
            if event_type.is_empty() || topic.is_empty() {
                return None;
            }
            Some((event_type.to_string(), topic.to_string()))
        })
        .collect()
}
