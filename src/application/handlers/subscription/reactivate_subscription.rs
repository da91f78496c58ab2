//! ReactivateSubscriptionHandler - Restores a cancelled subscription.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{CommissionRate, Timestamp, UserId};
use crate::domain::subscription::{
    BillingRecord, LifecycleChange, LogAction, Subject, Subscription, SubscriptionError,
    SubscriptionLog, SubscriptionStatus,
};
use crate::ports::{SubscriptionRepository, TierCatalog};

#[derive(Debug, Clone)]
pub struct ReactivateSubscriptionCommand {
    pub subject: Subject,
    pub actor_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactivateSubscriptionResult {
    pub subscription: Subscription,
    pub billing: BillingRecord,
    pub commission_rate: Option<CommissionRate>,
}

/// Handler for reactivation.
///
/// Requires a CANCELLED subscription. Starts a fresh billing window from
/// now, writes a billing history row for it and, for institutions, restores
/// the tier's commission rate. All of it is committed as one change.
pub struct ReactivateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn TierCatalog>,
    default_rate: CommissionRate,
}

impl ReactivateSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn TierCatalog>,
        default_rate: CommissionRate,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
            default_rate,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReactivateSubscriptionCommand,
    ) -> Result<ReactivateSubscriptionResult, SubscriptionError> {
        let now = Timestamp::now();

        let mut subscription = self
            .subscriptions
            .find_current(cmd.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(cmd.subject))?;

        if subscription.status != SubscriptionStatus::Cancelled {
            return Err(SubscriptionError::invalid_state(subscription.status, "reactivate"));
        }

        subscription.reactivate(now)?;

        let billing = BillingRecord::for_period(
            &subscription,
            format!("{} subscription reactivated", subscription.plan),
        );
        let mut change = LifecycleChange::new()
            .update(&subscription)
            .bill(billing.clone())
            .log(
                SubscriptionLog::entry(&subscription, LogAction::Reactivated, now)
                    .effective_at(now)
                    .by(cmd.actor_id),
            );
        let commission_rate = match cmd.subject {
            Subject::Institution(id) => {
                let rate = self.tier_rate(&subscription).await?;
                change = change.set_commission_rate(id, rate);
                Some(rate)
            }
            Subject::Student(_) => None,
        };
        self.subscriptions.commit(&change).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            subject = %cmd.subject,
            end_date = %subscription.end_date,
            "Subscription reactivated"
        );

        Ok(ReactivateSubscriptionResult {
            subscription,
            billing,
            commission_rate,
        })
    }

    async fn tier_rate(&self, subscription: &Subscription) -> Result<CommissionRate, SubscriptionError> {
        let Some(plan) = subscription.plan.as_institution() else {
            return Ok(self.default_rate);
        };
        match self.catalog.commission_tier(plan).await? {
            Some(tier) => Ok(tier.rate),
            None => {
                tracing::warn!(plan = %plan, "No commission tier, storing default rate");
                Ok(self.default_rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::{InstitutionPlan, StudentPlan};
    use crate::domain::foundation::ErrorKind;
    use crate::ports::{Directory, SubscriptionLogWriter};

    fn handler(platform: &TestPlatform) -> ReactivateSubscriptionHandler {
        ReactivateSubscriptionHandler::new(
            platform.subscription_port(),
            platform.catalog_port(),
            platform.config.default_commission_rate(),
        )
    }

    fn command(subject: Subject) -> ReactivateSubscriptionCommand {
        ReactivateSubscriptionCommand {
            subject,
            actor_id: None,
        }
    }

    #[tokio::test]
    async fn active_subscription_cannot_be_reactivated() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Basic).await;
        let err = handler(&platform)
            .handle(command(Subject::Student(user.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn reactivation_restores_tier_rate_and_bills() {
        let platform = TestPlatform::new();
        let (institution, mut sub) = platform
            .institution_with_plan(InstitutionPlan::Professional)
            .await;
        sub.cancel(Timestamp::now()).unwrap();
        platform.subscriptions.put(&sub).await;

        let result = handler(&platform)
            .handle(command(Subject::Institution(institution.id)))
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Active);
        assert!(result.subscription.auto_renew);
        assert_eq!(result.commission_rate, Some(CommissionRate::whole_percent(20)));
        assert_eq!(result.billing.amount, sub.amount);
        assert_eq!(platform.log.billing_for(sub.id).await.unwrap().len(), 1);

        let stored = platform
            .directory
            .find_institution(institution.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.commission_rate, Some(CommissionRate::whole_percent(20)));
    }

    #[tokio::test]
    async fn fresh_window_starts_now() {
        let platform = TestPlatform::new();
        let (user, mut sub) = platform.student_with_plan(StudentPlan::Basic).await;
        sub.start_date = sub.start_date.minus_days(20);
        sub.end_date = sub.end_date.minus_days(20);
        sub.cancel(Timestamp::now()).unwrap();
        platform.subscriptions.put(&sub).await;

        let before = Timestamp::now();
        let result = handler(&platform)
            .handle(command(Subject::Student(user.id)))
            .await
            .unwrap();
        assert!(!result.subscription.start_date.is_before(&before));
        assert_eq!(result.subscription.days_remaining(before), 30);
    }
}
