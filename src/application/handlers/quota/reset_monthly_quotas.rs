//! ResetMonthlyQuotasHandler - Platform-wide reset of monthly usage counters.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetMonthlyQuotasResult {
    pub subscriptions_reset: u64,
}

/// Zeroes monthly enrollment and attendance counters of every ACTIVE
/// subscription. Not tied to individual billing anniversaries.
pub struct ResetMonthlyQuotasHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ResetMonthlyQuotasHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(&self) -> Result<ResetMonthlyQuotasResult, DomainError> {
        let subscriptions_reset = self.subscriptions.reset_monthly_usage().await?;
        tracing::info!(subscriptions_reset, "Monthly quotas reset");
        Ok(ResetMonthlyQuotasResult {
            subscriptions_reset,
        })
    }
}
