//! CancelSubscriptionHandler - Cancels a subject's current subscription.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{CommissionRate, StateMachine, Timestamp, UserId};
use crate::domain::subscription::{
    LifecycleChange, LogAction, Subject, Subscription, SubscriptionError, SubscriptionLog,
    SubscriptionStatus,
};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subject: Subject,
    pub reason: Option<String>,
    pub actor_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    /// Rate now stored on the institution, for institution subjects.
    pub commission_rate: Option<CommissionRate>,
}

/// Handler for cancellations.
///
/// Cancelling stops auto-renew. For institutions the stored commission rate
/// is reset to the configured cancellation rate. The status change, the rate
/// and the log entry are committed together.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    cancelled_rate: CommissionRate,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, cancelled_rate: CommissionRate) -> Self {
        Self {
            subscriptions,
            cancelled_rate,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        let now = Timestamp::now();

        let mut subscription = self
            .subscriptions
            .find_current(cmd.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(cmd.subject))?;

        if !subscription
            .status
            .can_transition_to(&SubscriptionStatus::Cancelled)
        {
            return Err(SubscriptionError::invalid_state(subscription.status, "cancel"));
        }

        let mut entry = SubscriptionLog::entry(&subscription, LogAction::Cancelled, now)
            .effective_at(now)
            .by(cmd.actor_id);
        if let Some(reason) = cmd.reason {
            entry = entry.with_reason(reason);
        }

        subscription.cancel(now)?;

        let mut change = LifecycleChange::new().update(&subscription).log(entry);
        let commission_rate = match cmd.subject {
            Subject::Institution(id) => {
                change = change.set_commission_rate(id, self.cancelled_rate);
                Some(self.cancelled_rate)
            }
            Subject::Student(_) => None,
        };
        self.subscriptions.commit(&change).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            subject = %cmd.subject,
            "Subscription cancelled"
        );

        Ok(CancelSubscriptionResult {
            subscription,
            commission_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::{InstitutionPlan, StudentPlan};
    use crate::domain::foundation::ErrorKind;
    use crate::ports::Directory;

    fn handler(platform: &TestPlatform) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            platform.subscription_port(),
            platform.config.cancelled_commission_rate(),
        )
    }

    fn command(subject: Subject) -> CancelSubscriptionCommand {
        CancelSubscriptionCommand {
            subject,
            reason: Some("Closing down".to_string()),
            actor_id: None,
        }
    }

    #[tokio::test]
    async fn institution_cancel_resets_commission_rate() {
        let platform = TestPlatform::new();
        let (institution, _) = platform.institution_with_plan(InstitutionPlan::Enterprise).await;

        let result = handler(&platform)
            .handle(command(Subject::Institution(institution.id)))
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Cancelled);
        assert!(!result.subscription.auto_renew);
        assert_eq!(result.commission_rate, Some(CommissionRate::whole_percent(25)));

        let stored = platform
            .directory
            .find_institution(institution.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.commission_rate, Some(CommissionRate::whole_percent(25)));
        assert_eq!(platform.log.all_entries().await[0].action, LogAction::Cancelled);
    }

    #[tokio::test]
    async fn student_cancel_leaves_no_rate() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Basic).await;
        let result = handler(&platform)
            .handle(command(Subject::Student(user.id)))
            .await
            .unwrap();
        assert!(result.commission_rate.is_none());
    }

    #[tokio::test]
    async fn cancelling_twice_is_invalid_state() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Basic).await;
        let handler = handler(&platform);
        handler.handle(command(Subject::Student(user.id))).await.unwrap();

        let err = handler
            .handle(command(Subject::Student(user.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn failed_rate_write_leaves_subscription_active() {
        let platform = TestPlatform::new();
        // Subscription for an institution the directory doesn't know.
        let subject = Subject::Institution(crate::domain::foundation::InstitutionId::new());
        let sub = Subscription::create_paid(
            subject,
            &platform.institution_tier(InstitutionPlan::Starter),
            Timestamp::now(),
        );
        platform.subscriptions.save(&sub).await.unwrap();

        let err = handler(&platform).handle(command(subject)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);

        let stored = platform.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Active);
        assert!(platform.log.all_entries().await.is_empty());
    }
}
