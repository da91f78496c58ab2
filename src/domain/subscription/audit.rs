//! Append-only audit trail: lifecycle log entries and billing history.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::PlanType;
use crate::domain::foundation::{LogEntryId, Money, SubscriptionId, Timestamp, UserId};

use super::{Subject, Subscription};

/// Lifecycle action recorded in the subscription log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Upgraded,
    UpgradeScheduled,
    DowngradeScheduled,
    Cancelled,
    Reactivated,
    TrialExpired,
    FallbackCreated,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Upgraded => "UPGRADED",
            LogAction::UpgradeScheduled => "UPGRADE_SCHEDULED",
            LogAction::DowngradeScheduled => "DOWNGRADE_SCHEDULED",
            LogAction::Cancelled => "CANCELLED",
            LogAction::Reactivated => "REACTIVATED",
            LogAction::TrialExpired => "TRIAL_EXPIRED",
            LogAction::FallbackCreated => "FALLBACK_CREATED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "UPGRADED" => LogAction::Upgraded,
            "UPGRADE_SCHEDULED" => LogAction::UpgradeScheduled,
            "DOWNGRADE_SCHEDULED" => LogAction::DowngradeScheduled,
            "CANCELLED" => LogAction::Cancelled,
            "REACTIVATED" => LogAction::Reactivated,
            "TRIAL_EXPIRED" => LogAction::TrialExpired,
            "FALLBACK_CREATED" => LogAction::FallbackCreated,
            _ => return None,
        })
    }
}

/// One lifecycle log entry. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionLog {
    pub id: LogEntryId,
    pub subscription_id: SubscriptionId,
    pub subject: Subject,
    pub action: LogAction,
    pub old_plan: Option<PlanType>,
    pub new_plan: Option<PlanType>,
    pub old_amount: Option<Money>,
    pub new_amount: Option<Money>,
    /// Charge computed for an immediate upgrade. Recorded, not captured.
    pub proration: Option<Money>,
    /// When a scheduled change takes effect.
    pub effective_at: Option<Timestamp>,
    pub reason: Option<String>,
    pub actor_id: Option<UserId>,
    pub created_at: Timestamp,
}

impl SubscriptionLog {
    /// Start an entry for `subscription` with its current plan and amount
    /// as the "old" side.
    pub fn entry(subscription: &Subscription, action: LogAction, now: Timestamp) -> Self {
        Self {
            id: LogEntryId::new(),
            subscription_id: subscription.id,
            subject: subscription.subject,
            action,
            old_plan: Some(subscription.plan),
            new_plan: None,
            old_amount: Some(subscription.amount),
            new_amount: None,
            proration: None,
            effective_at: None,
            reason: None,
            actor_id: None,
            created_at: now,
        }
    }

    pub fn with_new(mut self, plan: PlanType, amount: Money) -> Self {
        self.new_plan = Some(plan);
        self.new_amount = Some(amount);
        self
    }

    pub fn with_proration(mut self, proration: Money) -> Self {
        self.proration = Some(proration);
        self
    }

    pub fn effective_at(mut self, at: Timestamp) -> Self {
        self.effective_at = Some(at);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn by(mut self, actor: Option<UserId>) -> Self {
        self.actor_id = actor;
        self
    }
}

/// One billed amount. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: LogEntryId,
    pub subscription_id: SubscriptionId,
    pub subject: Subject,
    pub amount: Money,
    pub description: String,
    pub billed_at: Timestamp,
}

impl BillingRecord {
    pub fn for_period(subscription: &Subscription, description: impl Into<String>) -> Self {
        Self {
            id: LogEntryId::new(),
            subscription_id: subscription.id,
            subject: subscription.subject,
            amount: subscription.amount,
            description: description.into(),
            billed_at: subscription.start_date,
        }
    }
}
