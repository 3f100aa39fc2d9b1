//! Domain layer for the claims service template.
//!
//! This crate provides the core domain abstractions including:
//! - `AggregateRoot` state with a pending domain-event buffer
//! - `HasPendingEvents` / `Mutable` capability traits and the `Aggregate` trait
//! - `DomainEvent` trait and `EventMetadata`
//! - Claim aggregate implementation with its status machine

pub mod aggregate;
pub mod claim;
pub mod error;
pub mod event;
pub mod validation;

pub use aggregate::{Aggregate, AggregateRoot, HasPendingEvents, Mutable};
pub use claim::{
    Claim, ClaimError, ClaimEvent, ClaimStatus, ClaimSubmission, CustomerId, Money, PolicyId,
};
pub use error::DomainError;
pub use event::{DomainEvent, EventMetadata};
pub use validation::ValidationErrors;
