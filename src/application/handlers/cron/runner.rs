//! CronRunner - Dispatches cron tasks to the batch handlers.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::application::handlers::analytics::{CommissionReportHandler, CommissionReportQuery};
use crate::application::handlers::batch::BatchReport;
use crate::application::handlers::commission::CalculatePendingCommissionsHandler;
use crate::application::handlers::quota::{ResetMonthlyQuotasHandler, ResetMonthlyQuotasResult};
use crate::application::handlers::subscription::ProcessExpiredTrialsHandler;
use crate::domain::analytics::CommissionReport;
use crate::domain::commission::CommissionError;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::subscription::SubscriptionError;

use super::CronTask;

/// Days covered by the `report` task.
const REPORT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum CronError {
    #[error("commissions task failed: {0}")]
    Commissions(#[from] CommissionError),

    #[error("subscriptions task failed: {0}")]
    Subscriptions(#[from] SubscriptionError),

    #[error("task failed: {0}")]
    Domain(#[from] DomainError),
}

/// Result of one concrete task.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum CronOutcome {
    Commissions(BatchReport),
    Report(CommissionReport),
    Subscriptions {
        expired_trials: BatchReport,
        quotas_reset: Option<ResetMonthlyQuotasResult>,
    },
}

pub struct CronRunner {
    pending_commissions: Arc<CalculatePendingCommissionsHandler>,
    commission_report: Arc<CommissionReportHandler>,
    expired_trials: Arc<ProcessExpiredTrialsHandler>,
    monthly_reset: Arc<ResetMonthlyQuotasHandler>,
    quota_reset_day: u32,
}

impl CronRunner {
    pub fn new(
        pending_commissions: Arc<CalculatePendingCommissionsHandler>,
        commission_report: Arc<CommissionReportHandler>,
        expired_trials: Arc<ProcessExpiredTrialsHandler>,
        monthly_reset: Arc<ResetMonthlyQuotasHandler>,
        quota_reset_day: u32,
    ) -> Self {
        Self {
            pending_commissions,
            commission_report,
            expired_trials,
            monthly_reset,
            quota_reset_day,
        }
    }

    pub async fn run(&self, task: CronTask) -> Result<Vec<CronOutcome>, CronError> {
        self.run_at(task, Timestamp::now()).await
    }

    /// Runs `task` as if the clock read `now`. Stops at the first failing task.
    pub async fn run_at(&self, task: CronTask, now: Timestamp) -> Result<Vec<CronOutcome>, CronError> {
        let mut outcomes = Vec::new();
        for step in task.expand() {
            tracing::info!(task = %step, "Cron task starting");
            let outcome = match self.run_one(step, now).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(task = %step, error = %err, "Cron task failed");
                    return Err(err);
                }
            };
            tracing::info!(task = %step, "Cron task finished");
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn run_one(&self, task: CronTask, now: Timestamp) -> Result<CronOutcome, CronError> {
        match task {
            CronTask::Commissions => {
                let report = self.pending_commissions.handle().await?;
                Ok(CronOutcome::Commissions(report))
            }
            CronTask::Report => {
                let query = CommissionReportQuery {
                    from: now.minus_days(REPORT_WINDOW_DAYS),
                    to: now,
                };
                let report = self.commission_report.handle(query).await?;
                Ok(CronOutcome::Report(report))
            }
            CronTask::Subscriptions => {
                let expired_trials = self.expired_trials.handle().await?;
                let quotas_reset = if now.day_of_month() == self.quota_reset_day {
                    Some(self.monthly_reset.handle().await?)
                } else {
                    tracing::debug!(
                        day = now.day_of_month(),
                        reset_day = self.quota_reset_day,
                        "Not a quota reset day"
                    );
                    None
                };
                Ok(CronOutcome::Subscriptions {
                    expired_trials,
                    quotas_reset,
                })
            }
            CronTask::All => Err(CronError::Domain(DomainError::new(
                ErrorCode::InvalidState,
                "'all' must be expanded before running",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::application::services::GovernanceServices;
    use crate::domain::catalog::{InstitutionPlan, StudentPlan};
    use crate::ports::SubscriptionRepository;
    use chrono::{TimeZone, Utc};

    fn at(day: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, day, 2, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn all_runs_every_task_in_order() {
        let platform = TestPlatform::new();
        let (institution, _) = platform.institution_with_plan(InstitutionPlan::Starter).await;
        platform.course_sale(institution.id, 10_000).await;
        let services = GovernanceServices::new(platform.ports(), &platform.config);

        let outcomes = services.cron.run_at(CronTask::All, at(15)).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        match &outcomes[0] {
            CronOutcome::Commissions(report) => assert_eq!(report.succeeded, 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(outcomes[1], CronOutcome::Report(_)));
        match &outcomes[2] {
            CronOutcome::Subscriptions { quotas_reset, .. } => assert!(quotas_reset.is_none()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn reset_day_zeroes_monthly_counters() {
        let platform = TestPlatform::new();
        let (_, mut sub) = platform.student_with_plan(StudentPlan::Basic).await;
        sub.usage.monthly_enrollments = 3;
        platform.subscriptions.put(&sub).await;
        let services = GovernanceServices::new(platform.ports(), &platform.config);

        let outcomes = services
            .cron
            .run_at(CronTask::Subscriptions, at(platform.config.quota_reset_day_of_month))
            .await
            .unwrap();

        match &outcomes[0] {
            CronOutcome::Subscriptions { quotas_reset, .. } => {
                assert_eq!(quotas_reset.as_ref().map(|r| r.subscriptions_reset), Some(1));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        let stored = platform.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.usage.monthly_enrollments, 0);
    }
}
