//! Publishing of aggregate domain events after persistence.
//!
//! An [`EventDispatcher`] drains an aggregate's pending-event buffer through
//! a [`Transport`], routing each event with a [`RoutingRule`]. The buffer is
//! cleared only when every send succeeded.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod routing;
pub mod transport;

pub use config::DispatcherConfig;
pub use dispatcher::{DispatchReport, EventDelivery, EventDispatcher};
pub use error::{DispatchError, Result};
pub use memory::{InMemoryTransport, SentMessage};
pub use routing::{DEFAULT_TOPIC, DefaultTopic, RoutingRule, TopicMap};
pub use transport::{Delivery, Transport, TransportError};
