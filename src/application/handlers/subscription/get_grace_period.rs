//! GetGracePeriodHandler - Query for a subject's grace window.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{GracePeriod, Subject, SubscriptionError};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct GetGracePeriodQuery {
    pub subject: Subject,
}

pub struct GetGracePeriodHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetGracePeriodHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(&self, query: GetGracePeriodQuery) -> Result<GracePeriod, SubscriptionError> {
        let subscription = self
            .subscriptions
            .find_current(query.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(query.subject))?;
        Ok(subscription.grace_period(Timestamp::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::StudentPlan;

    #[tokio::test]
    async fn lapsed_subscription_is_in_grace() {
        let platform = TestPlatform::new();
        let (user, mut sub) = platform.student_with_plan(StudentPlan::Premium).await;
        sub.end_date = Timestamp::now().minus_days(2);
        platform.subscriptions.put(&sub).await;

        let grace = GetGracePeriodHandler::new(platform.subscription_port())
            .handle(GetGracePeriodQuery {
                subject: Subject::Student(user.id),
            })
            .await
            .unwrap();

        assert!(grace.is_in_grace_period);
        assert_eq!(grace.expiry_date, sub.end_date.add_days(7));
        assert_eq!(grace.days_remaining, 4);
    }

    #[tokio::test]
    async fn running_subscription_is_not_in_grace() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Premium).await;
        let grace = GetGracePeriodHandler::new(platform.subscription_port())
            .handle(GetGracePeriodQuery {
                subject: Subject::Student(user.id),
            })
            .await
            .unwrap();
        assert!(!grace.is_in_grace_period);
        assert_eq!(grace.days_remaining, 0);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let platform = TestPlatform::new();
        let err = GetGracePeriodHandler::new(platform.subscription_port())
            .handle(GetGracePeriodQuery {
                subject: Subject::Student(crate::domain::foundation::UserId::new()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::NoSubscription(_)));
    }
}
