//! Claim status machine.

use serde::{Deserialize, Serialize};

/// The status of an insurance claim in its lifecycle.
///
/// Transitions:
/// ```text
/// Submitted ──┬──► DocumentRequested ──┐
///             │          ▲             ▼
///             └──────────┴──────► UnderReview ──► Accepted ──► Paid
///
/// Submitted | DocumentRequested | UnderReview ──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Claim has been filed and awaits triage.
    #[default]
    Submitted,

    /// Additional documents were requested from the claimant.
    DocumentRequested,

    /// An adjuster is reviewing the claim.
    UnderReview,

    /// Claim was accepted and awaits payment.
    Accepted,

    /// Claim was rejected (terminal state).
    Rejected,

    /// Claim was paid out (terminal state).
    Paid,
}

impl ClaimStatus {
    pub fn can_request_documents(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::UnderReview)
    }

    pub fn can_start_review(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::DocumentRequested)
    }

    pub fn can_accept(&self) -> bool {
        matches!(self, ClaimStatus::UnderReview)
    }

    pub fn can_reject(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Submitted | ClaimStatus::DocumentRequested | ClaimStatus::UnderReview
        )
    }

    pub fn can_pay(&self) -> bool {
        matches!(self, ClaimStatus::Accepted)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::DocumentRequested => "DOCUMENT_REQUESTED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::Accepted => "ACCEPTED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::Paid => "PAID",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
