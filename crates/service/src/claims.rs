//! Claim commands.

use common::AggregateId;
use domain::{Aggregate, Claim, ClaimError, ClaimSubmission, Money, Mutable};
use messaging::{DefaultTopic, EventDispatcher, RoutingRule, Transport};
use repository::{AggregateRepository, SaveOptions};

use crate::application::ApplicationService;
use crate::error::Result;

/// Application service for the claim aggregate.
///
/// Every command loads the claim, runs the business method, commits the
/// result and publishes its events. The returned claim reflects the
/// committed state.
pub struct ClaimService<R, T, Rt = DefaultTopic> {
    app: ApplicationService<Claim, R, T, Rt>,
}

impl<R, T, Rt> ClaimService<R, T, Rt>
where
    R: AggregateRepository<Claim>,
    T: Transport<domain::ClaimEvent>,
    Rt: RoutingRule,
{
    pub fn new(repository: R, transport: T, dispatcher: EventDispatcher<Rt>) -> Self {
        Self {
            app: ApplicationService::new(repository, transport, dispatcher),
        }
    }

    /// Returns the underlying commit-then-dispatch service.
    pub fn application(&self) -> &ApplicationService<Claim, R, T, Rt> {
        &self.app
    }

    /// Files a new claim.
    #[tracing::instrument(skip(self, submission), fields(policy_id = %submission.policy_id))]
    pub async fn submit_claim(&self, submission: ClaimSubmission) -> Result<Claim> {
        let mut claim = Claim::submit(submission)?;
        self.app
            .commit_and_dispatch(&mut claim, SaveOptions::expect_new())
            .await?;
        tracing::info!(claim_id = %claim.id(), "claim submitted");
        Ok(claim)
    }

    #[tracing::instrument(skip(self, documents))]
    pub async fn request_documents(&self, id: AggregateId, documents: Vec<String>) -> Result<Claim> {
        self.execute(id, |claim| claim.request_documents(documents))
            .await
    }

    #[tracing::instrument(skip(self, reviewer))]
    pub async fn start_review(&self, id: AggregateId, reviewer: impl Into<String>) -> Result<Claim> {
        let reviewer = reviewer.into();
        self.execute(id, |claim| claim.start_review(reviewer)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn accept_claim(&self, id: AggregateId, approved_amount: Money) -> Result<Claim> {
        self.execute(id, |claim| claim.accept(approved_amount)).await
    }

    #[tracing::instrument(skip(self, reason))]
    pub async fn reject_claim(&self, id: AggregateId, reason: impl Into<String>) -> Result<Claim> {
        let reason = reason.into();
        self.execute(id, |claim| claim.reject(reason)).await
    }

    #[tracing::instrument(skip(self, payment_reference))]
    pub async fn mark_paid(
        &self,
        id: AggregateId,
        payment_reference: impl Into<String>,
    ) -> Result<Claim> {
        let payment_reference = payment_reference.into();
        self.execute(id, |claim| claim.mark_paid(payment_reference))
            .await
    }

    /// Loads a claim by ID.
    pub async fn get_claim(&self, id: AggregateId) -> Result<Claim> {
        self.app.load(id).await
    }

    async fn execute<F>(&self, id: AggregateId, command: F) -> Result<Claim>
    where
        F: FnOnce(&mut Claim) -> std::result::Result<(), ClaimError>,
    {
        let mut claim = self.app.load(id).await?;
        let prior = claim.version();

        command(&mut claim)?;

        self.app
            .commit_and_dispatch(&mut claim, SaveOptions::expect_version(prior))
            .await?;
        tracing::info!(status = %claim.status(), version = %claim.version(), "claim updated");
        Ok(claim)
    }
}
