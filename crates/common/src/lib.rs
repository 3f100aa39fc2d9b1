//! Shared identifier, version and clock types.

pub mod clock;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use types::{AggregateId, EventId, Version};
