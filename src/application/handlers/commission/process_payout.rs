//! ProcessPayoutHandler - Pays out an institution's pending commissions.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::commission::{CommissionError, Payout, PayoutMethod};
use crate::domain::foundation::{CommissionId, ErrorCode, InstitutionId, Money, Timestamp};
use crate::ports::{CommissionRepository, Directory};

#[derive(Debug, Clone)]
pub struct ProcessPayoutCommand {
    pub institution_id: InstitutionId,
    pub amount: Money,
    pub method: PayoutMethod,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessPayoutResult {
    pub payout: Payout,
    pub settled: Vec<CommissionId>,
    pub pending_total: Money,
}

/// Creates one payout and marks every PENDING commission of the
/// institution PAID against it.
///
/// The sweep takes all pending commissions whenever the requested amount
/// is at most their total; a smaller amount does not select a subset.
pub struct ProcessPayoutHandler {
    commissions: Arc<dyn CommissionRepository>,
    directory: Arc<dyn Directory>,
}

impl ProcessPayoutHandler {
    pub fn new(commissions: Arc<dyn CommissionRepository>, directory: Arc<dyn Directory>) -> Self {
        Self {
            commissions,
            directory,
        }
    }

    pub async fn handle(&self, cmd: ProcessPayoutCommand) -> Result<ProcessPayoutResult, CommissionError> {
        if !cmd.amount.is_positive() {
            return Err(CommissionError::validation("amount", "Payout amount must be positive"));
        }
        if cmd.reference.trim().is_empty() {
            return Err(CommissionError::validation("reference", "Payout reference is required"));
        }
        if self
            .directory
            .find_institution(cmd.institution_id)
            .await?
            .is_none()
        {
            return Err(CommissionError::InstitutionNotFound(cmd.institution_id));
        }

        let pending = self
            .commissions
            .pending_for_institution(cmd.institution_id)
            .await?;
        if pending.is_empty() {
            return Err(CommissionError::NoPendingCommissions(cmd.institution_id));
        }

        let pending_total: Money = pending.iter().map(|r| r.commission_amount).sum();
        if cmd.amount > pending_total {
            return Err(CommissionError::PayoutExceedsPending {
                requested: cmd.amount,
                pending: pending_total,
            });
        }
        if cmd.amount < pending_total {
            tracing::warn!(
                institution_id = %cmd.institution_id,
                requested = %cmd.amount,
                pending = %pending_total,
                "Partial payout settles every pending commission"
            );
        }

        let settled: Vec<CommissionId> = pending.iter().map(|r| r.id).collect();
        let payout = Payout::completed(
            cmd.institution_id,
            cmd.amount,
            cmd.method,
            cmd.reference,
            settled.len() as u32,
            Timestamp::now(),
        );

        self.commissions
            .settle(&payout, &settled)
            .await
            .map_err(|e| match e.code {
                ErrorCode::Conflict => CommissionError::PayoutConflict(cmd.institution_id),
                _ => CommissionError::from(e),
            })?;

        tracing::info!(
            payout_id = %payout.id,
            institution_id = %cmd.institution_id,
            amount = %payout.amount,
            method = payout.method.as_str(),
            commissions = settled.len(),
            "Commission payout processed"
        );

        Ok(ProcessPayoutResult {
            payout,
            settled,
            pending_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commission::{CommissionBreakdown, CommissionRecord, CommissionStatus};
    use crate::domain::foundation::{CommissionRate, ErrorKind, PaymentId};
    use crate::application::handlers::test_support::TestPlatform;

    async fn seed_pending(platform: &TestPlatform, institution: InstitutionId, cents: &[i64]) {
        for &c in cents {
            let record = CommissionRecord::pending(
                institution,
                PaymentId::new(),
                CommissionBreakdown::compute(Money::from_cents(c), CommissionRate::whole_percent(100)),
                Timestamp::now(),
            );
            platform.commissions.upsert(&record).await.unwrap();
        }
    }

    fn handler(platform: &TestPlatform) -> ProcessPayoutHandler {
        ProcessPayoutHandler::new(platform.commission_port(), platform.directory_port())
    }

    fn command(institution_id: InstitutionId, cents: i64) -> ProcessPayoutCommand {
        ProcessPayoutCommand {
            institution_id,
            amount: Money::from_cents(cents),
            method: PayoutMethod::BankTransfer,
            reference: "ref1".to_string(),
        }
    }

    #[tokio::test]
    async fn exact_payout_settles_all_three() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        seed_pending(&platform, institution.id, &[10_000, 5_000, 2_500]).await;

        let result = handler(&platform)
            .handle(command(institution.id, 17_500))
            .await
            .unwrap();

        assert_eq!(result.payout.amount, Money::from_cents(17_500));
        assert_eq!(result.settled.len(), 3);

        let records = platform
            .commissions
            .list_for_institution(institution.id)
            .await
            .unwrap();
        assert!(records.iter().all(|r| r.status == CommissionStatus::Paid
            && r.payout_id == Some(result.payout.id)));
        assert_eq!(
            platform
                .commissions
                .payouts_for_institution(institution.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn over_request_changes_nothing() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        seed_pending(&platform, institution.id, &[10_000, 5_000, 2_500]).await;

        let err = handler(&platform)
            .handle(command(institution.id, 20_000))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(
            platform
                .commissions
                .pending_for_institution(institution.id)
                .await
                .unwrap()
                .len(),
            3
        );
        assert!(platform
            .commissions
            .payouts_for_institution(institution.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn nothing_pending_is_invalid_state() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        let err = handler(&platform)
            .handle(command(institution.id, 100))
            .await
            .unwrap_err();
        assert_eq!(err, CommissionError::NoPendingCommissions(institution.id));
    }

    #[tokio::test]
    async fn blank_reference_is_rejected() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        let mut cmd = command(institution.id, 100);
        cmd.reference = "  ".to_string();
        let err = handler(&platform).handle(cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
