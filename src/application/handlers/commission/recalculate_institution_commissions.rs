//! RecalculateInstitutionCommissionsHandler - Re-rate pending commissions.

use std::sync::Arc;

use crate::application::handlers::batch::BatchReport;
use crate::domain::commission::{CommissionBreakdown, CommissionError};
use crate::domain::foundation::{InstitutionId, Timestamp};
use crate::ports::CommissionRepository;

use super::CommissionRateResolver;

#[derive(Debug, Clone)]
pub struct RecalculateInstitutionCommissionsCommand {
    pub institution_id: InstitutionId,
}

/// Re-derives every PENDING commission of an institution at its current
/// tier rate. Paid commissions are left alone.
pub struct RecalculateInstitutionCommissionsHandler {
    commissions: Arc<dyn CommissionRepository>,
    rates: Arc<CommissionRateResolver>,
}

impl RecalculateInstitutionCommissionsHandler {
    pub fn new(commissions: Arc<dyn CommissionRepository>, rates: Arc<CommissionRateResolver>) -> Self {
        Self { commissions, rates }
    }

    pub async fn handle(
        &self,
        cmd: RecalculateInstitutionCommissionsCommand,
    ) -> Result<BatchReport, CommissionError> {
        let now = Timestamp::now();
        let (_, rate) = self.rates.tier_rate(cmd.institution_id).await?;
        let pending = self
            .commissions
            .pending_for_institution(cmd.institution_id)
            .await?;

        let mut report = BatchReport::default();
        for mut record in pending {
            let id = *record.id.as_uuid();
            record.apply_breakdown(CommissionBreakdown::compute(record.payment_amount, rate), now);
            match self.commissions.upsert(&record).await {
                Ok(_) => report.record_success(),
                Err(e) => {
                    tracing::error!(commission_id = %record.id, error = %e, "Recalculation failed");
                    report.record_failure(id, e);
                }
            }
        }

        tracing::info!(
            institution_id = %cmd.institution_id,
            rate = %rate,
            recalculated = report.succeeded,
            failed = report.failed(),
            "Institution commissions recalculated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::commission::{
        CalculateCommissionCommand, CalculateCommissionHandler,
    };
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::InstitutionPlan;
    use crate::domain::foundation::Money;

    #[tokio::test]
    async fn pending_records_follow_new_plan_rate() {
        let platform = TestPlatform::new();
        let (institution, mut sub) =
            platform.institution_with_plan(InstitutionPlan::Starter).await;
        let calculator = CalculateCommissionHandler::new(
            platform.payment_port(),
            platform.enrollment_port(),
            platform.course_port(),
            platform.commission_port(),
            platform.rate_resolver(),
        );
        for cents in [10_000, 20_000] {
            let payment = platform.course_sale(institution.id, cents).await;
            calculator
                .handle(CalculateCommissionCommand {
                    payment_id: payment.id,
                })
                .await
                .unwrap();
        }

        sub.apply_tier(
            &platform.institution_tier(InstitutionPlan::Enterprise),
            Timestamp::now(),
        )
        .unwrap();
        platform.subscriptions.put(&sub).await;

        let report = RecalculateInstitutionCommissionsHandler::new(
            platform.commission_port(),
            platform.rate_resolver(),
        )
        .handle(RecalculateInstitutionCommissionsCommand {
            institution_id: institution.id,
        })
        .await
        .unwrap();

        assert_eq!(report.succeeded, 2);
        let total: Money = platform
            .commissions
            .pending_for_institution(institution.id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.commission_amount)
            .sum();
        assert_eq!(total, Money::from_cents(4_500));
    }
}
