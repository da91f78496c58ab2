//! HandleTrialExpirationHandler - Replaces a lapsed trial with a fallback.
//!
//! The trial row is kept and marked EXPIRED; a new zero-cost fallback row
//! referencing it becomes the subject's current subscription. Both rows, the
//! institution's new commission rate and the two log entries are committed
//! as one change, so a lapsed trial is either fully replaced or untouched.

use serde::Serialize;
use std::sync::Arc;

use crate::config::GovernanceConfig;
use crate::domain::catalog::{InstitutionPlan, PlanType, StudentPlan, Tier};
use crate::domain::foundation::{CommissionRate, Timestamp};
use crate::domain::subscription::{
    LifecycleChange, LogAction, Subject, Subscription, SubscriptionError, SubscriptionLog,
    SubscriptionStatus,
};
use crate::ports::{SubscriptionRepository, TierCatalog};

#[derive(Debug, Clone)]
pub struct HandleTrialExpirationCommand {
    pub subject: Subject,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialExpirationResult {
    pub expired: Subscription,
    pub fallback: Subscription,
    pub commission_rate: Option<CommissionRate>,
}

/// Where lapsed trials land.
#[derive(Debug, Clone, Copy)]
pub struct TrialFallbackPolicy {
    pub student_plan: StudentPlan,
    pub institution_plan: InstitutionPlan,
    pub period_days: i64,
    pub default_rate: CommissionRate,
}

impl TrialFallbackPolicy {
    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self {
            student_plan: config.fallback_student_plan,
            institution_plan: config.fallback_institution_plan,
            period_days: config.fallback_period_days,
            default_rate: config.default_commission_rate(),
        }
    }
}

pub struct HandleTrialExpirationHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn TierCatalog>,
    policy: TrialFallbackPolicy,
}

impl HandleTrialExpirationHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn TierCatalog>,
        policy: TrialFallbackPolicy,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleTrialExpirationCommand,
    ) -> Result<TrialExpirationResult, SubscriptionError> {
        let subscription = self
            .subscriptions
            .find_current(cmd.subject)
            .await?
            .ok_or(SubscriptionError::NoSubscription(cmd.subject))?;

        self.expire(subscription, Timestamp::now()).await
    }

    /// Expire one trial row.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the row is not a TRIAL
    /// - `TrialNotExpired` if its `end_date` is still ahead
    /// - `PlanNotOffered` if the fallback plan has no active tier
    pub async fn expire(
        &self,
        mut original: Subscription,
        now: Timestamp,
    ) -> Result<TrialExpirationResult, SubscriptionError> {
        if original.status != SubscriptionStatus::Trial {
            return Err(SubscriptionError::invalid_state(original.status, "expire trial"));
        }
        if !original.trial_has_lapsed(now) {
            return Err(SubscriptionError::TrialNotExpired(original.id));
        }

        let fallback_tier = self.fallback_tier(original.subject).await?;
        let fallback =
            Subscription::create_fallback(&original, &fallback_tier, now, self.policy.period_days);
        original.expire(now)?;

        let mut change = LifecycleChange::new()
            .update(&original)
            .insert(&fallback)
            .log(
                SubscriptionLog::entry(&original, LogAction::TrialExpired, now)
                    .effective_at(now)
                    .with_reason("Trial ended without payment"),
            )
            .log(
                SubscriptionLog::entry(&fallback, LogAction::FallbackCreated, now)
                    .effective_at(now)
                    .with_reason(format!("Fallback for trial {}", original.id)),
            );
        let commission_rate = match original.subject {
            Subject::Institution(id) => {
                let rate = self.fallback_rate().await?;
                change = change.set_commission_rate(id, rate);
                Some(rate)
            }
            Subject::Student(_) => None,
        };
        self.subscriptions.commit(&change).await?;

        tracing::info!(
            trial_id = %original.id,
            fallback_id = %fallback.id,
            subject = %original.subject,
            plan = %fallback.plan,
            "Trial expired, fallback subscription created"
        );

        Ok(TrialExpirationResult {
            expired: original,
            fallback,
            commission_rate,
        })
    }

    async fn fallback_tier(&self, subject: Subject) -> Result<Tier, SubscriptionError> {
        match subject {
            Subject::Student(_) => self
                .catalog
                .student_tier(self.policy.student_plan)
                .await?
                .map(Tier::Student)
                .ok_or(SubscriptionError::PlanNotOffered(PlanType::Student(
                    self.policy.student_plan,
                ))),
            Subject::Institution(_) => self
                .catalog
                .institution_tier(self.policy.institution_plan)
                .await?
                .map(Tier::Institution)
                .ok_or(SubscriptionError::PlanNotOffered(PlanType::Institution(
                    self.policy.institution_plan,
                ))),
        }
    }

    async fn fallback_rate(&self) -> Result<CommissionRate, SubscriptionError> {
        Ok(self
            .catalog
            .commission_tier(self.policy.institution_plan)
            .await?
            .map(|tier| tier.rate)
            .unwrap_or(self.policy.default_rate))
    }
}
