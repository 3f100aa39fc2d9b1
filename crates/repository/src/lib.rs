pub mod error;
pub mod memory;
pub mod store;
pub mod stored;

pub use common::{AggregateId, Version};
pub use error::{RepositoryError, Result};
pub use memory::InMemoryAggregateRepository;
pub use store::{AggregateRepository, SaveOptions, StorableAggregate, check_expected_version};
pub use stored::StoredAggregate;
