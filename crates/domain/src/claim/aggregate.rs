//! Claim aggregate implementation.

use chrono::{NaiveDate, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::validation::ValidationErrors;

use super::{ClaimError, ClaimEvent, ClaimStatus, ClaimSubmission, CustomerId, Money, PolicyId};

const MAX_DESCRIPTION_LEN: usize = 2000;

/// Insurance claim aggregate root.
///
/// Every business method validates first, then changes state, registers
/// exactly one event and marks one mutation. A rejected command leaves the
/// claim untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    root: AggregateRoot<ClaimEvent>,
    policy_id: PolicyId,
    customer_id: CustomerId,
    incident_date: NaiveDate,
    description: String,
    amount: Money,
    status: ClaimStatus,
    approved_amount: Option<Money>,
    requested_documents: Vec<String>,
    reviewer: Option<String>,
    rejection_reason: Option<String>,
    payment_reference: Option<String>,
}

impl Aggregate for Claim {
    type Event = ClaimEvent;

    fn aggregate_type() -> &'static str {
        "Claim"
    }

    fn root(&self) -> &AggregateRoot<ClaimEvent> {
        &self.root
    }

    fn root_mut(&mut self) -> &mut AggregateRoot<ClaimEvent> {
        &mut self.root
    }
}

impl PartialEq for Claim {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for Claim {}

// Query methods
impl Claim {
    pub fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn incident_date(&self) -> NaiveDate {
        self.incident_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the amount claimed by the customer.
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn approved_amount(&self) -> Option<Money> {
        self.approved_amount
    }

    pub fn requested_documents(&self) -> &[String] {
        &self.requested_documents
    }

    pub fn reviewer(&self) -> Option<&str> {
        self.reviewer.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods
impl Claim {
    /// Files a new claim with a generated ID.
    pub fn submit(submission: ClaimSubmission) -> Result<Self, ClaimError> {
        Self::submit_with_id(AggregateId::new(), submission)
    }

    /// Files a new claim under a caller-supplied ID.
    pub fn submit_with_id(id: AggregateId, submission: ClaimSubmission) -> Result<Self, ClaimError> {
        validate_submission(&submission)?;

        let ClaimSubmission {
            policy_id,
            customer_id,
            incident_date,
            description,
            amount,
        } = submission;

        let mut claim = Self {
            root: AggregateRoot::with_id(id),
            policy_id: policy_id.clone(),
            customer_id,
            incident_date,
            description: description.clone(),
            amount,
            status: ClaimStatus::Submitted,
            approved_amount: None,
            requested_documents: Vec::new(),
            reviewer: None,
            rejection_reason: None,
            payment_reference: None,
        };

        claim.record(ClaimEvent::claim_submitted(
            id,
            policy_id,
            customer_id,
            incident_date,
            description,
            amount,
        ));
        Ok(claim)
    }

    /// Asks the claimant for additional documents.
    pub fn request_documents(&mut self, documents: Vec<String>) -> Result<(), ClaimError> {
        self.ensure(self.status.can_request_documents(), "request documents")?;

        let documents: Vec<String> = documents
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        if documents.is_empty() {
            return Err(ValidationErrors::field("documents", "at least one document is required").into());
        }

        self.status = ClaimStatus::DocumentRequested;
        self.requested_documents.extend(documents.iter().cloned());
        self.record(ClaimEvent::documents_requested(self.id(), documents));
        Ok(())
    }

    /// Assigns the claim to a reviewer.
    pub fn start_review(&mut self, reviewer: impl Into<String>) -> Result<(), ClaimError> {
        self.ensure(self.status.can_start_review(), "start review")?;

        let reviewer = reviewer.into();
        if reviewer.trim().is_empty() {
            return Err(ValidationErrors::field("reviewer", "is required").into());
        }

        self.status = ClaimStatus::UnderReview;
        self.reviewer = Some(reviewer.clone());
        self.record(ClaimEvent::review_started(self.id(), reviewer));
        Ok(())
    }

    /// Accepts the claim for `approved_amount`, which may not exceed the
    /// claimed amount.
    pub fn accept(&mut self, approved_amount: Money) -> Result<(), ClaimError> {
        self.ensure(self.status.can_accept(), "accept")?;

        if !approved_amount.is_positive() {
            return Err(ValidationErrors::field("approved_amount", "must be greater than 0").into());
        }
        if approved_amount > self.amount {
            return Err(ValidationErrors::field(
                "approved_amount",
                format!("must not exceed the claimed amount of {}", self.amount),
            )
            .into());
        }

        self.status = ClaimStatus::Accepted;
        self.approved_amount = Some(approved_amount);
        self.record(ClaimEvent::claim_accepted(self.id(), approved_amount));
        Ok(())
    }

    /// Rejects the claim.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), ClaimError> {
        self.ensure(self.status.can_reject(), "reject")?;

        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ValidationErrors::field("reason", "is required").into());
        }

        self.status = ClaimStatus::Rejected;
        self.rejection_reason = Some(reason.clone());
        self.record(ClaimEvent::claim_rejected(self.id(), reason));
        Ok(())
    }

    /// Records the payout of an accepted claim.
    pub fn mark_paid(&mut self, payment_reference: impl Into<String>) -> Result<(), ClaimError> {
        self.ensure(self.status.can_pay(), "mark paid")?;

        let payment_reference = payment_reference.into();
        if payment_reference.trim().is_empty() {
            return Err(ValidationErrors::field("payment_reference", "is required").into());
        }
        let amount = self.approved_amount.unwrap_or(self.amount);

        self.status = ClaimStatus::Paid;
        self.payment_reference = Some(payment_reference.clone());
        self.record(ClaimEvent::claim_paid(self.id(), amount, payment_reference));
        Ok(())
    }
}

// Helpers
impl Claim {
    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), ClaimError> {
        if allowed {
            Ok(())
        } else {
            Err(ClaimError::InvalidStateTransition {
                current_state: self.status,
                action,
            })
        }
    }

    fn record(&mut self, event: ClaimEvent) {
        self.root.register_event(event);
        self.root.mark_mutated();
    }
}

fn validate_submission(submission: &ClaimSubmission) -> Result<(), ClaimError> {
    let mut errors = ValidationErrors::new("Claim submission is invalid");

    if submission.policy_id.is_blank() {
        errors.add("policy_id", "is required");
    }
    let description = submission.description.trim();
    if description.is_empty() {
        errors.add("description", "is required");
    } else if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.add(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        );
    }
    if !submission.amount.is_positive() {
        errors.add("amount", "must be greater than 0");
    }
    if submission.incident_date > Utc::now().date_naive() {
        errors.add("incident_date", "must not be in the future");
    }

    errors.into_result().map_err(ClaimError::Validation)
}
