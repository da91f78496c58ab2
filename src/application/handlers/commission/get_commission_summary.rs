//! GetCommissionSummaryHandler - Pending and paid totals of an institution.

use std::sync::Arc;

use crate::domain::commission::{CommissionError, CommissionSummary};
use crate::domain::foundation::InstitutionId;
use crate::ports::CommissionRepository;

use super::CommissionRateResolver;

#[derive(Debug, Clone)]
pub struct GetCommissionSummaryQuery {
    pub institution_id: InstitutionId,
}

pub struct GetCommissionSummaryHandler {
    commissions: Arc<dyn CommissionRepository>,
    rates: Arc<CommissionRateResolver>,
}

impl GetCommissionSummaryHandler {
    pub fn new(commissions: Arc<dyn CommissionRepository>, rates: Arc<CommissionRateResolver>) -> Self {
        Self { commissions, rates }
    }

    pub async fn handle(&self, query: GetCommissionSummaryQuery) -> Result<CommissionSummary, CommissionError> {
        let resolved = self.rates.reporting_rate(query.institution_id).await?;
        let records = self
            .commissions
            .list_for_institution(query.institution_id)
            .await?;
        Ok(CommissionSummary::from_records(
            query.institution_id,
            resolved.rate,
            &records,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::commission::{CommissionBreakdown, CommissionRecord};
    use crate::domain::foundation::{CommissionRate, Money, PaymentId, PayoutId, Timestamp};

    #[tokio::test]
    async fn totals_split_by_status() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        let rate = CommissionRate::whole_percent(20);
        for (cents, paid) in [(10_000, true), (5_000, false), (2_500, false)] {
            let mut record = CommissionRecord::pending(
                institution.id,
                PaymentId::new(),
                CommissionBreakdown::compute(Money::from_cents(cents), rate),
                Timestamp::now(),
            );
            if paid {
                record.mark_paid(PayoutId::new(), Timestamp::now());
            }
            platform.commissions.upsert(&record).await.unwrap();
        }

        let summary = GetCommissionSummaryHandler::new(
            platform.commission_port(),
            platform.rate_resolver(),
        )
        .handle(GetCommissionSummaryQuery {
            institution_id: institution.id,
        })
        .await
        .unwrap();

        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.paid_amount, Money::from_cents(2_000));
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.pending_amount, Money::from_cents(1_500));
        assert_eq!(summary.current_rate, rate);
    }

    #[tokio::test]
    async fn unknown_institution_is_not_found() {
        let platform = TestPlatform::new();
        let id = InstitutionId::new();
        let err = GetCommissionSummaryHandler::new(platform.commission_port(), platform.rate_resolver())
            .handle(GetCommissionSummaryQuery { institution_id: id })
            .await
            .unwrap_err();
        assert_eq!(err, CommissionError::InstitutionNotFound(id));
    }
}
