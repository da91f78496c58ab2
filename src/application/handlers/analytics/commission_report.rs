//! CommissionReportHandler - Platform commissions within a date window.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::analytics::CommissionReport;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{CommissionRepository, Directory};

#[derive(Debug, Clone)]
pub struct CommissionReportQuery {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl CommissionReportQuery {
    /// The `days` leading up to now.
    pub fn trailing_days(days: i64) -> Self {
        let to = Timestamp::now();
        Self {
            from: to.minus_days(days),
            to,
        }
    }
}

pub struct CommissionReportHandler {
    commissions: Arc<dyn CommissionRepository>,
    directory: Arc<dyn Directory>,
}

impl CommissionReportHandler {
    pub fn new(commissions: Arc<dyn CommissionRepository>, directory: Arc<dyn Directory>) -> Self {
        Self {
            commissions,
            directory,
        }
    }

    pub async fn handle(&self, query: CommissionReportQuery) -> Result<CommissionReport, DomainError> {
        if !query.from.is_before(&query.to) {
            return Err(DomainError::validation("from", "Report start must be before its end"));
        }

        let records = self.commissions.list_between(query.from, query.to).await?;

        let mut names = HashMap::new();
        for record in &records {
            if names.contains_key(&record.institution_id) {
                continue;
            }
            if let Some(institution) = self.directory.find_institution(record.institution_id).await? {
                names.insert(institution.id, institution.name);
            }
        }

        let report = CommissionReport::build(query.from, query.to, &records, &names);
        tracing::info!(
            from = %report.from,
            to = %report.to,
            payments = report.payment_count,
            commission = %report.commission_total,
            institutions = report.institutions.len(),
            "Commission report generated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::commission::{CommissionBreakdown, CommissionRecord};
    use crate::domain::foundation::{CommissionRate, ErrorKind, Money, PaymentId};

    #[tokio::test]
    async fn window_excludes_older_records() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        let rate = CommissionRate::whole_percent(20);
        for (cents, age_days) in [(10_000, 1), (20_000, 45)] {
            let record = CommissionRecord::pending(
                institution.id,
                PaymentId::new(),
                CommissionBreakdown::compute(Money::from_cents(cents), rate),
                Timestamp::now().minus_days(age_days),
            );
            platform.commissions.upsert(&record).await.unwrap();
        }

        let report = CommissionReportHandler::new(platform.commission_port(), platform.directory_port())
            .handle(CommissionReportQuery::trailing_days(30))
            .await
            .unwrap();

        assert_eq!(report.payment_count, 1);
        assert_eq!(report.commission_total, Money::from_cents(2_000));
        assert_eq!(report.institutions[0].institution_name, institution.name);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let platform = TestPlatform::new();
        let now = Timestamp::now();
        let err = CommissionReportHandler::new(platform.commission_port(), platform.directory_port())
            .handle(CommissionReportQuery {
                from: now,
                to: now.minus_days(1),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
