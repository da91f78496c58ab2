//! GetSubscriptionStatusHandler - Institution plan and commission overview.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::catalog::PlanType;
use crate::domain::commission::CommissionError;
use crate::domain::foundation::{InstitutionId, Timestamp};
use crate::domain::subscription::{Subject, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

use super::{CommissionRateResolver, ResolvedRate};

#[derive(Debug, Clone)]
pub struct GetSubscriptionStatusQuery {
    pub institution_id: InstitutionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstitutionSubscriptionStatus {
    pub institution_id: InstitutionId,
    pub has_active_subscription: bool,
    pub plan: Option<PlanType>,
    pub status: Option<SubscriptionStatus>,
    pub end_date: Option<Timestamp>,
    pub days_remaining: u32,
    pub commission: ResolvedRate,
}

pub struct GetSubscriptionStatusHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    rates: Arc<CommissionRateResolver>,
}

impl GetSubscriptionStatusHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, rates: Arc<CommissionRateResolver>) -> Self {
        Self {
            subscriptions,
            rates,
        }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionStatusQuery,
    ) -> Result<InstitutionSubscriptionStatus, CommissionError> {
        let commission = self.rates.reporting_rate(query.institution_id).await?;
        let current = self
            .subscriptions
            .find_current(Subject::Institution(query.institution_id))
            .await?;

        Ok(InstitutionSubscriptionStatus {
            institution_id: query.institution_id,
            has_active_subscription: current.as_ref().map_or(false, |s| s.is_active()),
            plan: current.as_ref().map(|s| s.plan),
            status: current.as_ref().map(|s| s.status),
            end_date: current.as_ref().map(|s| s.end_date),
            days_remaining: current
                .as_ref()
                .map_or(0, |s| s.days_remaining(Timestamp::now())),
            commission,
        })
    }
}
