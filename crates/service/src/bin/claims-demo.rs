//! Runs one claim through its lifecycle against the in-memory wiring and
//! logs every published event.

use chrono::NaiveDate;
use domain::{Aggregate, ClaimSubmission, CustomerId, Money};
use service::{ServiceConfig, init_tracing, in_memory_claim_service};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration and initialize tracing
    let config = ServiceConfig::from_env();
    init_tracing(&config);
    tracing::info!(service = %config.service_name, "starting");

    // 2. Wire the service
    let claims = in_memory_claim_service(&config);

    // 3. Drive a claim from submission to payment
    let incident_date = NaiveDate::from_ymd_opt(2024, 9, 14).ok_or("invalid incident date")?;
    let claim = claims
        .submit_claim(ClaimSubmission::new(
            "POL-2024-0001",
            CustomerId::new(),
            incident_date,
            "Hail damage to roof and gutters",
            Money::from_dollars(3_200),
        ))
        .await?;
    let id = claim.id();

    claims
        .request_documents(id, vec!["roof photos".to_string()])
        .await?;
    claims.start_review(id, "adjuster-1").await?;
    claims.accept_claim(id, Money::from_dollars(2_950)).await?;
    let claim = claims.mark_paid(id, "PAY-0001").await?;

    let transport = claims.application().transport();
    tracing::info!(
        claim_id = %id,
        status = %claim.status(),
        events_published = transport.sent_count(),
        "claim lifecycle complete"
    );

    Ok(())
}
