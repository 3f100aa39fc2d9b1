//! Application layer for the claims service template.
//!
//! Commands persist an aggregate first and publish its domain events after
//! the save has succeeded.

pub mod application;
pub mod claims;
pub mod config;
pub mod error;
pub mod telemetry;

pub use application::ApplicationService;
pub use claims::ClaimService;
pub use config::{LogFormat, ServiceConfig};
pub use error::{Result, ServiceError};
pub use telemetry::{init_tracing, try_init_tracing};

use domain::Claim;
use messaging::{EventDispatcher, InMemoryTransport, TopicMap};
use repository::InMemoryAggregateRepository;

/// A claim service wired to in-memory storage and transport.
pub type InMemoryClaimService =
    ClaimService<InMemoryAggregateRepository<Claim>, InMemoryTransport, TopicMap>;

/// Builds an [`InMemoryClaimService`] with routing and timeout from `config`.
pub fn in_memory_claim_service(config: &ServiceConfig) -> InMemoryClaimService {
    ClaimService::new(
        InMemoryAggregateRepository::new(),
        InMemoryTransport::new(),
        EventDispatcher::from_config(&config.dispatcher),
    )
}
