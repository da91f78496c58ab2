//! UsageAlertsHandler - Threshold alerts across all active subscriptions.

use std::sync::Arc;

use crate::domain::analytics::UsageAlert;
use crate::domain::foundation::{DomainError, Percentage};
use crate::ports::SubscriptionRepository;

pub struct UsageAlertsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    alert_threshold: Percentage,
}

impl UsageAlertsHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, alert_threshold: Percentage) -> Self {
        Self {
            subscriptions,
            alert_threshold,
        }
    }

    pub async fn handle(&self) -> Result<Vec<UsageAlert>, DomainError> {
        let alerts: Vec<UsageAlert> = self
            .subscriptions
            .find_active()
            .await?
            .into_iter()
            .flat_map(|subscription| {
                subscription
                    .usage
                    .readings(&subscription.limits, self.alert_threshold)
                    .into_iter()
                    .filter_map(|reading| reading.alert_message())
                    .map(|message| UsageAlert {
                        subject: subscription.subject,
                        subscription_id: subscription.id,
                        message,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        tracing::debug!(count = alerts.len(), "Usage alerts collected");
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::StudentPlan;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn only_active_subscriptions_past_threshold_alert() {
        let platform = TestPlatform::new();
        let (_, mut busy) = platform.student_with_plan(StudentPlan::Basic).await;
        busy.usage.current_enrollments = 5;
        platform.subscriptions.put(&busy).await;

        let (_, _quiet) = platform.student_with_plan(StudentPlan::Basic).await;

        let (_, mut cancelled) = platform.student_with_plan(StudentPlan::Basic).await;
        cancelled.usage.current_enrollments = 5;
        cancelled.cancel(Timestamp::now()).unwrap();
        platform.subscriptions.put(&cancelled).await;

        let alerts = UsageAlertsHandler::new(
            platform.subscription_port(),
            platform.config.usage_alert_threshold(),
        )
        .handle()
        .await
        .unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subscription_id, busy.id);
        assert_eq!(
            alerts[0].message,
            "You have reached your limit of 5 active course enrollments"
        );
    }
}
