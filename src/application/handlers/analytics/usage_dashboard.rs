//! UsageDashboardHandler - A student's counters against their quotas.

use std::sync::Arc;

use crate::domain::analytics::UsageDashboard;
use crate::domain::foundation::{DomainError, ErrorCode, Percentage, Timestamp, UserId};
use crate::domain::subscription::Subject;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct UsageDashboardQuery {
    pub user_id: UserId,
}

pub struct UsageDashboardHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    alert_threshold: Percentage,
}

impl UsageDashboardHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, alert_threshold: Percentage) -> Self {
        Self {
            subscriptions,
            alert_threshold,
        }
    }

    pub async fn handle(&self, query: UsageDashboardQuery) -> Result<UsageDashboard, DomainError> {
        let subscription = self
            .subscriptions
            .find_current(Subject::Student(query.user_id))
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("No current subscription for user {}", query.user_id),
                )
            })?;

        let readings = subscription
            .usage
            .readings(&subscription.limits, self.alert_threshold);
        let alerts = readings.iter().filter_map(|r| r.alert_message()).collect();

        Ok(UsageDashboard {
            user_id: query.user_id,
            subscription_id: subscription.id,
            plan: subscription.plan,
            status: subscription.status,
            readings,
            alerts,
            grace_period: subscription.grace_period(Timestamp::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::StudentPlan;
    use crate::domain::foundation::ErrorKind;
    use crate::domain::subscription::{QuotaStatus, UsageMetric};

    #[tokio::test]
    async fn reports_each_counter() {
        let platform = TestPlatform::new();
        let (student, mut sub) = platform.student_with_plan(StudentPlan::Basic).await;
        sub.usage.current_enrollments = 4;
        sub.usage.monthly_enrollments = 2;
        sub.usage.monthly_attendance = 20;
        platform.subscriptions.put(&sub).await;

        let dashboard = UsageDashboardHandler::new(
            platform.subscription_port(),
            platform.config.usage_alert_threshold(),
        )
        .handle(UsageDashboardQuery { user_id: student.id })
        .await
        .unwrap();

        assert_eq!(dashboard.readings.len(), 3);
        let current = dashboard
            .readings
            .iter()
            .find(|r| r.metric == UsageMetric::CurrentEnrollments)
            .unwrap();
        assert!(matches!(current.status, QuotaStatus::Warning { .. }));
        let attendance = dashboard
            .readings
            .iter()
            .find(|r| r.metric == UsageMetric::MonthlyAttendance)
            .unwrap();
        assert_eq!(attendance.status, QuotaStatus::AtLimit);
        assert_eq!(dashboard.alerts.len(), 2);
    }

    #[tokio::test]
    async fn user_without_subscription_is_not_found() {
        let platform = TestPlatform::new();
        let err = UsageDashboardHandler::new(
            platform.subscription_port(),
            platform.config.usage_alert_threshold(),
        )
        .handle(UsageDashboardQuery {
            user_id: UserId::new(),
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
