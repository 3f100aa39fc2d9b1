//! Claim domain events.

use chrono::NaiveDate;
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::event::{DomainEvent, EventMetadata};

use super::{CustomerId, Money, PolicyId};

/// Schema version stamped on every claim event.
pub const SCHEMA_VERSION: &str = "1.0";

/// Events that can occur on a claim aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClaimEvent {
    /// Claim was filed.
    ClaimSubmitted(ClaimSubmittedData),

    /// Documents were requested from the claimant.
    DocumentsRequested(DocumentsRequestedData),

    /// Review by an adjuster started.
    ReviewStarted(ReviewStartedData),

    /// Claim was accepted for payment.
    ClaimAccepted(ClaimAcceptedData),

    /// Claim was rejected.
    ClaimRejected(ClaimRejectedData),

    /// Claim was paid out.
    ClaimPaid(ClaimPaidData),
}

impl DomainEvent for ClaimEvent {
    fn metadata(&self) -> &EventMetadata {
        match self {
            ClaimEvent::ClaimSubmitted(data) => &data.metadata,
            ClaimEvent::DocumentsRequested(data) => &data.metadata,
            ClaimEvent::ReviewStarted(data) => &data.metadata,
            ClaimEvent::ClaimAccepted(data) => &data.metadata,
            ClaimEvent::ClaimRejected(data) => &data.metadata,
            ClaimEvent::ClaimPaid(data) => &data.metadata,
        }
    }
}

/// Data for ClaimSubmitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmittedData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    pub policy_id: PolicyId,
    pub customer_id: CustomerId,
    pub incident_date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

/// Data for DocumentsRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsRequestedData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    /// Names of the requested documents.
    pub documents: Vec<String>,
}

/// Data for ReviewStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStartedData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    pub reviewer: String,
}

/// Data for ClaimAccepted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimAcceptedData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    /// Amount approved for payment, at most the claimed amount.
    pub approved_amount: Money,
}

/// Data for ClaimRejected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRejectedData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    pub reason: String,
}

/// Data for ClaimPaid event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimPaidData {
    pub metadata: EventMetadata,
    pub claim_id: AggregateId,
    pub amount: Money,
    /// Reference assigned by the payment system.
    pub payment_reference: String,
}

// Convenience constructors
impl ClaimEvent {
    pub fn claim_submitted(
        claim_id: AggregateId,
        policy_id: PolicyId,
        customer_id: CustomerId,
        incident_date: NaiveDate,
        description: String,
        amount: Money,
    ) -> Self {
        ClaimEvent::ClaimSubmitted(ClaimSubmittedData {
            metadata: EventMetadata::new("ClaimSubmitted", SCHEMA_VERSION),
            claim_id,
            policy_id,
            customer_id,
            incident_date,
            description,
            amount,
        })
    }

    pub fn documents_requested(claim_id: AggregateId, documents: Vec<String>) -> Self {
        ClaimEvent::DocumentsRequested(DocumentsRequestedData {
            metadata: EventMetadata::new("DocumentsRequested", SCHEMA_VERSION),
            claim_id,
            documents,
        })
    }

    pub fn review_started(claim_id: AggregateId, reviewer: String) -> Self {
        ClaimEvent::ReviewStarted(ReviewStartedData {
            metadata: EventMetadata::new("ReviewStarted", SCHEMA_VERSION),
            claim_id,
            reviewer,
        })
    }

    pub fn claim_accepted(claim_id: AggregateId, approved_amount: Money) -> Self {
        ClaimEvent::ClaimAccepted(ClaimAcceptedData {
            metadata: EventMetadata::new("ClaimAccepted", SCHEMA_VERSION),
            claim_id,
            approved_amount,
        })
    }

    pub fn claim_rejected(claim_id: AggregateId, reason: String) -> Self {
        ClaimEvent::ClaimRejected(ClaimRejectedData {
            metadata: EventMetadata::new("ClaimRejected", SCHEMA_VERSION),
            claim_id,
            reason,
        })
    }

    pub fn claim_paid(claim_id: AggregateId, amount: Money, payment_reference: String) -> Self {
        ClaimEvent::ClaimPaid(ClaimPaidData {
            metadata: EventMetadata::new("ClaimPaid", SCHEMA_VERSION),
            claim_id,
            amount,
            payment_reference,
        })
    }
}
