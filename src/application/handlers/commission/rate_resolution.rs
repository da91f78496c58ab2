//! Commission rate lookup for institutions.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::commission::CommissionError;
use crate::domain::foundation::{CommissionRate, InstitutionId};
use crate::domain::subscription::{Subject, Subscription};
use crate::ports::{Directory, SubscriptionRepository, TierCatalog};

/// Where a reported rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    /// Commission tier of the institution's active plan.
    Tier,
    /// Rate stored on the institution record.
    Institution,
    /// Configured platform default.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRate {
    pub rate: CommissionRate,
    pub source: RateSource,
}

/// Shared by the calculation and reporting handlers.
pub struct CommissionRateResolver {
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn TierCatalog>,
    directory: Arc<dyn Directory>,
    default_rate: CommissionRate,
}

impl CommissionRateResolver {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn TierCatalog>,
        directory: Arc<dyn Directory>,
        default_rate: CommissionRate,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
            directory,
            default_rate,
        }
    }

    /// Rate of the commission tier matching the institution's active plan.
    ///
    /// Never falls back to a default.
    ///
    /// # Errors
    ///
    /// - `InstitutionNotFound`
    /// - `NoSubscription` if the institution has no current subscription
    /// - `SubscriptionInactive` if it is not ACTIVE
    /// - `CommissionTierNotFound` if the plan has no active commission tier
    pub async fn tier_rate(
        &self,
        institution_id: InstitutionId,
    ) -> Result<(Subscription, CommissionRate), CommissionError> {
        if self.directory.find_institution(institution_id).await?.is_none() {
            return Err(CommissionError::InstitutionNotFound(institution_id));
        }

        let subscription = self
            .subscriptions
            .find_current(Subject::Institution(institution_id))
            .await?
            .ok_or(CommissionError::NoSubscription(institution_id))?;

        if !subscription.is_active() {
            return Err(CommissionError::SubscriptionInactive {
                institution: institution_id,
                status: subscription.status,
            });
        }

        let plan = subscription
            .plan
            .as_institution()
            .ok_or(CommissionError::CommissionTierNotFound(subscription.plan))?;
        let tier = self
            .catalog
            .commission_tier(plan)
            .await?
            .filter(|tier| tier.is_active)
            .ok_or(CommissionError::CommissionTierNotFound(subscription.plan))?;

        Ok((subscription, tier.rate))
    }

    /// Rate for reporting: tier rate, else the institution's stored rate,
    /// else the configured default.
    ///
    /// # Errors
    ///
    /// - `InstitutionNotFound`
    pub async fn reporting_rate(
        &self,
        institution_id: InstitutionId,
    ) -> Result<ResolvedRate, CommissionError> {
        let institution = self
            .directory
            .find_institution(institution_id)
            .await?
            .ok_or(CommissionError::InstitutionNotFound(institution_id))?;

        match self.tier_rate(institution_id).await {
            Ok((_, rate)) => {
                return Ok(ResolvedRate {
                    rate,
                    source: RateSource::Tier,
                })
            }
            Err(CommissionError::Infrastructure(msg)) => {
                return Err(CommissionError::Infrastructure(msg))
            }
            Err(_) => {}
        }

        Ok(match institution.commission_rate {
            Some(rate) => ResolvedRate {
                rate,
                source: RateSource::Institution,
            },
            None => ResolvedRate {
                rate: self.default_rate,
                source: RateSource::Default,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::InstitutionPlan;
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::SubscriptionStatus;

    #[tokio::test]
    async fn active_plan_uses_its_commission_tier() {
        let platform = TestPlatform::new();
        let (institution, _) = platform.institution_with_plan(InstitutionPlan::Enterprise).await;

        let (_, rate) = platform.rate_resolver().tier_rate(institution.id).await.unwrap();
        assert_eq!(rate, CommissionRate::whole_percent(15));
    }

    #[tokio::test]
    async fn strict_path_refuses_missing_subscription() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;

        let err = platform.rate_resolver().tier_rate(institution.id).await.unwrap_err();
        assert_eq!(err, CommissionError::NoSubscription(institution.id));
    }

    #[tokio::test]
    async fn strict_path_refuses_cancelled_subscription() {
        let platform = TestPlatform::new();
        let (institution, mut sub) =
            platform.institution_with_plan(InstitutionPlan::Starter).await;
        sub.cancel(Timestamp::now()).unwrap();
        platform.subscriptions.put(&sub).await;

        let err = platform.rate_resolver().tier_rate(institution.id).await.unwrap_err();
        assert_eq!(
            err,
            CommissionError::SubscriptionInactive {
                institution: institution.id,
                status: SubscriptionStatus::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn reporting_falls_back_to_stored_then_default() {
        let platform = TestPlatform::new();
        let institution = platform.institution().await;
        let resolver = platform.rate_resolver();

        let resolved = resolver.reporting_rate(institution.id).await.unwrap();
        assert_eq!(resolved.source, RateSource::Default);
        assert_eq!(resolved.rate, CommissionRate::whole_percent(20));

        platform
            .directory
            .set_commission_rate(institution.id, CommissionRate::whole_percent(25))
            .await
            .unwrap();
        let resolved = resolver.reporting_rate(institution.id).await.unwrap();
        assert_eq!(resolved.source, RateSource::Institution);
        assert_eq!(resolved.rate, CommissionRate::whole_percent(25));
    }

    #[tokio::test]
    async fn reporting_prefers_tier_rate() {
        let platform = TestPlatform::new();
        let (institution, _) = platform.institution_with_plan(InstitutionPlan::Professional).await;
        platform
            .directory
            .set_commission_rate(institution.id, CommissionRate::whole_percent(25))
            .await
            .unwrap();

        let resolved = platform.rate_resolver().reporting_rate(institution.id).await.unwrap();
        assert_eq!(resolved.source, RateSource::Tier);
        assert_eq!(resolved.rate, CommissionRate::whole_percent(20));
    }
}
