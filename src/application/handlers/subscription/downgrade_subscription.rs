//! DowngradeSubscriptionHandler - Schedules a move onto a lower tier.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{TierId, Timestamp, UserId};
use crate::domain::subscription::{
    LogAction, Subject, Subscription, SubscriptionError, SubscriptionLog, SubscriptionStatus,
};
use crate::ports::{EnrollmentRepository, SubscriptionLogWriter, SubscriptionRepository, TierCatalog};

#[derive(Debug, Clone)]
pub struct DowngradeSubscriptionCommand {
    pub subject: Subject,
    pub new_tier_id: TierId,
    pub reason: Option<String>,
    /// Defaults to the subscription's `end_date`.
    pub effective_date: Option<Timestamp>,
    pub actor_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DowngradeSubscriptionResult {
    pub subscription: Subscription,
    pub effective_at: Timestamp,
}

/// Handler for tier downgrades.
///
/// A downgrade never strands a subject over quota: it is refused when the
/// active enrollment count or `current_enrollments` exceeds the new tier's
/// enrollment quota. Nothing is mutated; a scheduled log row is written.
pub struct DowngradeSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    catalog: Arc<dyn TierCatalog>,
    log: Arc<dyn SubscriptionLogWriter>,
}

impl DowngradeSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        catalog: Arc<dyn TierCatalog>,
        log: Arc<dyn SubscriptionLogWriter>,
    ) -> Self {
        Self {
            subscriptions,
            enrollments,
            catalog,
            log,
        }
    }

    pub async fn handle(
        &self,
        cmd: DowngradeSubscriptionCommand,
    ) -> Result<DowngradeSubscriptionResult, SubscriptionError> {
        let now = Timestamp::now();

        let subscription = self
            .subscriptions
            .find_current(cmd.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(cmd.subject))?;

        let tier = self
            .catalog
            .find_tier(cmd.new_tier_id)
            .await?
            .ok_or(SubscriptionError::TierNotFound(cmd.new_tier_id))?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(SubscriptionError::invalid_state(subscription.status, "downgrade"));
        }
        if !subscription.plan.same_family(&tier.plan()) {
            return Err(SubscriptionError::validation(
                "tier_id",
                format!("Cannot move a {} subscription onto {}", subscription.plan, tier.plan()),
            ));
        }
        if tier.plan().rank() >= subscription.plan.rank() {
            return Err(SubscriptionError::validation(
                "tier_id",
                format!("{} is not below the current {} plan", tier.plan(), subscription.plan),
            ));
        }

        // Capacity: the larger of stored and counted enrollments must fit
        let active = match cmd.subject {
            Subject::Student(user_id) => self.enrollments.count_active_for_user(user_id).await?,
            Subject::Institution(id) => self.enrollments.count_active_for_institution(id).await?,
        };
        let used = active.max(subscription.usage.current_enrollments);
        let limit = tier.limits().enrollment_quota;
        if used > limit {
            return Err(SubscriptionError::CapacityExceeded {
                resource: "enrollments",
                used,
                limit,
            });
        }

        let effective_at = cmd.effective_date.unwrap_or(subscription.end_date);
        if effective_at.is_before(&now) {
            return Err(SubscriptionError::validation(
                "effective_date",
                "Effective date cannot be in the past",
            ));
        }

        let mut entry = SubscriptionLog::entry(&subscription, LogAction::DowngradeScheduled, now)
            .with_new(tier.plan(), tier.price())
            .effective_at(effective_at)
            .by(cmd.actor_id);
        if let Some(reason) = cmd.reason {
            entry = entry.with_reason(reason);
        }
        self.log.append(&entry).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            subject = %cmd.subject,
            plan = %tier.plan(),
            effective_at = %effective_at,
            "Subscription downgrade scheduled"
        );

        Ok(DowngradeSubscriptionResult {
            subscription,
            effective_at,
        })
    }
}
