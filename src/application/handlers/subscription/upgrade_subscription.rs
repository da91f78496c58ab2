//! UpgradeSubscriptionHandler - Moves a subject onto a higher tier.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{Money, TierId, Timestamp, UserId};
use crate::domain::subscription::{
    LifecycleChange, LogAction, Subject, Subscription, SubscriptionError, SubscriptionLog, SubscriptionStatus,
};
use crate::ports::{SubscriptionLogWriter, SubscriptionRepository, TierCatalog};

#[derive(Debug, Clone)]
pub struct UpgradeSubscriptionCommand {
    pub subject: Subject,
    pub new_tier_id: TierId,
    /// Swap now and prorate, or schedule the swap for `end_date`.
    pub immediate: bool,
    pub actor_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeSubscriptionResult {
    pub subscription: Subscription,
    /// Recorded for billing; no charge is captured here.
    pub proration: Money,
    pub applied_now: bool,
    pub effective_at: Timestamp,
}

/// Handler for tier upgrades.
///
/// Immediate upgrades rewrite the subscription in place with the new tier's
/// price and quotas. Proration is `new daily rate × days remaining − current
/// daily rate × days remaining`, floored at zero.
pub struct UpgradeSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn TierCatalog>,
    log: Arc<dyn SubscriptionLogWriter>,
}

impl UpgradeSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn TierCatalog>,
        log: Arc<dyn SubscriptionLogWriter>,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
            log,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpgradeSubscriptionCommand,
    ) -> Result<UpgradeSubscriptionResult, SubscriptionError> {
        let now = Timestamp::now();

        // 1. Load subscription and target tier
        let mut subscription = self
            .subscriptions
            .find_current(cmd.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(cmd.subject))?;

        let tier = self
            .catalog
            .find_tier(cmd.new_tier_id)
            .await?
            .ok_or(SubscriptionError::TierNotFound(cmd.new_tier_id))?;

        // 2. Validate the move
        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(SubscriptionError::invalid_state(subscription.status, "upgrade"));
        }
        if !tier.is_active() {
            return Err(SubscriptionError::validation(
                "tier_id",
                format!("Tier {} is no longer offered", tier.name()),
            ));
        }
        if !subscription.plan.same_family(&tier.plan()) {
            return Err(SubscriptionError::validation(
                "tier_id",
                format!("Cannot move a {} subscription onto {}", subscription.plan, tier.plan()),
            ));
        }
        if tier.plan().rank() <= subscription.plan.rank() {
            return Err(SubscriptionError::validation(
                "tier_id",
                format!("{} is not above the current {} plan", tier.plan(), subscription.plan),
            ));
        }

        let proration = subscription.upgrade_proration(&tier, now);
        let entry = SubscriptionLog::entry(
            &subscription,
            if cmd.immediate {
                LogAction::Upgraded
            } else {
                LogAction::UpgradeScheduled
            },
            now,
        )
        .with_new(tier.plan(), tier.price())
        .by(cmd.actor_id);

        // 3. Apply now (row and log in one commit) or only log the schedule
        let effective_at = if cmd.immediate {
            subscription.apply_tier(&tier, now)?;
            let change = LifecycleChange::new()
                .update(&subscription)
                .log(entry.with_proration(proration).effective_at(now));
            self.subscriptions.commit(&change).await?;
            now
        } else {
            let at = subscription.end_date;
            self.log.append(&entry.effective_at(at)).await?;
            at
        };

        tracing::info!(
            subscription_id = %subscription.id,
            subject = %cmd.subject,
            plan = %tier.plan(),
            immediate = cmd.immediate,
            proration = %proration,
            "Subscription upgrade"
        );

        Ok(UpgradeSubscriptionResult {
            subscription,
            proration: if cmd.immediate { proration } else { Money::ZERO },
            applied_now: cmd.immediate,
            effective_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::{InstitutionPlan, StudentPlan};
    use crate::domain::foundation::ErrorKind;

    fn handler(platform: &TestPlatform) -> UpgradeSubscriptionHandler {
        UpgradeSubscriptionHandler::new(
            platform.subscription_port(),
            platform.catalog_port(),
            platform.log_port(),
        )
    }

    fn command(subject: Subject, tier: TierId, immediate: bool) -> UpgradeSubscriptionCommand {
        UpgradeSubscriptionCommand {
            subject,
            new_tier_id: tier,
            immediate,
            actor_id: None,
        }
    }

    #[tokio::test]
    async fn immediate_upgrade_copies_quotas_and_prorates() {
        let platform = TestPlatform::new();
        let (user, mut sub) = platform.student_with_plan(StudentPlan::Basic).await;
        sub.end_date = sub.end_date.add_hours(1);
        platform.subscriptions.put(&sub).await;
        let premium = platform.student_tier(StudentPlan::Premium);

        let result = handler(&platform)
            .handle(command(Subject::Student(user.id), premium.id(), true))
            .await
            .unwrap();

        assert!(result.applied_now);
        assert_eq!(result.subscription.id, sub.id);
        assert_eq!(result.subscription.limits, premium.limits());
        assert_eq!(result.subscription.amount, premium.price());
        // 30 days left: 1999 - 999 cents for the period.
        assert_eq!(result.proration, Money::from_cents(1_000));

        let entries = platform.log.all_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, LogAction::Upgraded);
        assert_eq!(entries[0].proration, Some(Money::from_cents(1_000)));
    }

    #[tokio::test]
    async fn scheduled_upgrade_only_logs() {
        let platform = TestPlatform::new();
        let (user, sub) = platform.student_with_plan(StudentPlan::Basic).await;
        let pro = platform.student_tier(StudentPlan::Pro);

        let result = handler(&platform)
            .handle(command(Subject::Student(user.id), pro.id(), false))
            .await
            .unwrap();

        assert!(!result.applied_now);
        assert_eq!(result.effective_at, sub.end_date);
        let stored = platform.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.plan, sub.plan);

        let entries = platform.log.all_entries().await;
        assert_eq!(entries[0].action, LogAction::UpgradeScheduled);
        assert_eq!(entries[0].effective_at, Some(sub.end_date));
    }

    #[tokio::test]
    async fn missing_subscription_is_not_found() {
        let platform = TestPlatform::new();
        let premium = platform.student_tier(StudentPlan::Premium);
        let err = handler(&platform)
            .handle(command(Subject::Student(UserId::new()), premium.id(), true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unknown_tier_is_not_found() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Basic).await;
        let err = handler(&platform)
            .handle(command(Subject::Student(user.id), TierId::new(), true))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::TierNotFound(_)));
    }

    #[tokio::test]
    async fn institution_tier_cannot_be_applied_to_student() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Basic).await;
        let starter = platform.institution_tier(InstitutionPlan::Starter);
        let err = handler(&platform)
            .handle(command(Subject::Student(user.id), starter.id(), true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn lower_tier_is_not_an_upgrade() {
        let platform = TestPlatform::new();
        let (user, _) = platform.student_with_plan(StudentPlan::Premium).await;
        let basic = platform.student_tier(StudentPlan::Basic);
        let err = handler(&platform)
            .handle(command(Subject::Student(user.id), basic.id(), true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
