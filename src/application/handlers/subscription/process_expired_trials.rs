//! ProcessExpiredTrialsHandler - Batch sweep of lapsed trials.

use std::sync::Arc;

use crate::application::handlers::batch::BatchReport;
use crate::domain::foundation::Timestamp;
use crate::domain::subscription::SubscriptionError;
use crate::ports::SubscriptionRepository;

use super::HandleTrialExpirationHandler;

/// Expires every TRIAL row whose `end_date` has passed.
///
/// Continue-on-error: a failing trial is logged and counted, the sweep
/// moves on. Only a failure to list the trials aborts the batch.
pub struct ProcessExpiredTrialsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    expiration: Arc<HandleTrialExpirationHandler>,
}

impl ProcessExpiredTrialsHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        expiration: Arc<HandleTrialExpirationHandler>,
    ) -> Self {
        Self {
            subscriptions,
            expiration,
        }
    }

    pub async fn handle(&self) -> Result<BatchReport, SubscriptionError> {
        let now = Timestamp::now();
        let trials = self.subscriptions.find_lapsed_trials(now).await?;
        let mut report = BatchReport::default();

        for trial in trials {
            let id = trial.id;
            match self.expiration.expire(trial, now).await {
                Ok(_) => report.record_success(),
                Err(e) => {
                    tracing::warn!(subscription_id = %id, error = %e, "Trial expiration failed");
                    report.record_failure(*id.as_uuid(), e);
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Expired trials processed"
        );
        Ok(report)
    }
}
