//! Subscription aggregate entity.
//!
//! One model serves students and institutions. A subject may own several
//! rows over time (a lapsed trial is superseded, not deleted); the current
//! subscription is the most recent row that is not Expired.
//!
//! # Design Decisions
//!
//! - **Limits are copied**: the tier's quotas are copied onto the row when it
//!   moves onto a tier, so catalog edits never retroactively change quotas
//! - **Rejected, not clamped**: counters never exceed the enrollment quota
//! - **Money in cents**: all monetary values stored as `Money` (i64 cents)

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{BillingCycle, PlanType, QuotaLimits, Tier};
use crate::domain::foundation::{
    DomainError, ErrorCode, Money, StateMachine, SubscriptionId, TierId, Timestamp,
};

use super::{Subject, SubscriptionOrigin, SubscriptionStatus, UsageCounters};

/// Subscription aggregate.
///
/// # Invariants
///
/// - `start_date <= end_date`
/// - `usage.current_enrollments` and `usage.monthly_enrollments` never exceed
///   `limits.enrollment_quota`
/// - `plan` and `tier_id` always name the same catalog tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub subject: Subject,
    pub tier_id: TierId,
    pub plan: PlanType,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    /// Price per billing cycle.
    pub amount: Money,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub limits: QuotaLimits,
    pub usage: UsageCounters,
    pub auto_renew: bool,
    pub origin: SubscriptionOrigin,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub cancelled_at: Option<Timestamp>,
}

/// Grace-period view of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePeriod {
    pub is_in_grace_period: bool,
    /// Whole days until `expiry_date`; zero outside the window.
    pub days_remaining: u32,
    /// `end_date + grace_period_days`.
    pub expiry_date: Timestamp,
}

impl Subscription {
    /// Create a paid subscription that starts now and runs one billing cycle.
    pub fn create_paid(subject: Subject, tier: &Tier, now: Timestamp) -> Self {
        let end = now.add_days(tier.billing_cycle().days());
        Self::build(
            subject,
            tier,
            SubscriptionStatus::Active,
            SubscriptionOrigin::Regular,
            now,
            end,
        )
    }

    /// Create a free trial on `tier` lasting `trial_days`.
    pub fn create_trial(subject: Subject, tier: &Tier, now: Timestamp, trial_days: i64) -> Self {
        let mut sub = Self::build(
            subject,
            tier,
            SubscriptionStatus::Trial,
            SubscriptionOrigin::Trial,
            now,
            now.add_days(trial_days),
        );
        sub.amount = Money::ZERO;
        sub
    }

    /// Create the zero-cost replacement for a lapsed trial.
    ///
    /// The fallback is Active, does not auto-renew and references the trial
    /// it supersedes.
    pub fn create_fallback(
        original: &Subscription,
        fallback_tier: &Tier,
        now: Timestamp,
        period_days: i64,
    ) -> Self {
        let mut sub = Self::build(
            original.subject,
            fallback_tier,
            SubscriptionStatus::Active,
            SubscriptionOrigin::Fallback {
                original_id: original.id,
            },
            now,
            now.add_days(period_days),
        );
        sub.amount = Money::ZERO;
        sub.auto_renew = false;
        sub
    }

    fn build(
        subject: Subject,
        tier: &Tier,
        status: SubscriptionStatus,
        origin: SubscriptionOrigin,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            subject,
            tier_id: tier.id(),
            plan: tier.plan(),
            status,
            billing_cycle: tier.billing_cycle(),
            amount: tier.price(),
            start_date: start,
            end_date: end,
            limits: tier.limits(),
            usage: UsageCounters::default(),
            auto_renew: true,
            origin,
            created_at: start,
            updated_at: start,
            cancelled_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whole days until `end_date`, zero once it has passed.
    pub fn days_remaining(&self, now: Timestamp) -> u32 {
        now.whole_days_until(&self.end_date)
    }

    /// Trials whose window has closed (`end_date <= now`).
    pub fn trial_has_lapsed(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Trial && !self.end_date.is_after(&now)
    }

    /// Move the subscription onto `tier`, copying its price and quotas.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `tier` belongs to the other family.
    pub fn apply_tier(&mut self, tier: &Tier, now: Timestamp) -> Result<(), DomainError> {
        if !self.plan.same_family(&tier.plan()) {
            return Err(DomainError::validation(
                "tier_id",
                format!(
                    "Tier {} is a {} plan, subscription is on {}",
                    tier.id(),
                    tier.plan(),
                    self.plan
                ),
            ));
        }
        self.tier_id = tier.id();
        self.plan = tier.plan();
        self.billing_cycle = tier.billing_cycle();
        self.amount = tier.price();
        self.limits = tier.limits();
        self.updated_at = now;
        Ok(())
    }

    /// Cost of switching to `new_tier` for the rest of the current period.
    ///
    /// `new daily rate × days remaining − current daily rate × days
    /// remaining`, floored at zero.
    pub fn upgrade_proration(&self, new_tier: &Tier, now: Timestamp) -> Money {
        let days = self.days_remaining(now);
        let new_cost = new_tier.prorated_price(days);
        let current_cost = self.billing_cycle.prorate(self.amount, days);
        (new_cost - current_cost).non_negative()
    }

    /// Stop auto-renew and mark Cancelled.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.auto_renew = false;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Restore a Cancelled subscription with a fresh window from `now`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidState` error unless the subscription is Cancelled.
    pub fn reactivate(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status != SubscriptionStatus::Cancelled {
            return Err(DomainError::new(
                ErrorCode::InvalidState,
                format!(
                    "Only cancelled subscriptions can be reactivated, status is {}",
                    self.status
                ),
            ));
        }
        self.transition_to(SubscriptionStatus::Active)?;
        self.start_date = now;
        self.end_date = now.add_days(self.billing_cycle.days());
        self.auto_renew = true;
        self.cancelled_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Mark this subscription as expired.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.auto_renew = false;
        self.updated_at = now;
        Ok(())
    }

    /// Grace window is `end_date + grace_period_days`; in-grace iff `now`
    /// is strictly between `end_date` and the window's end.
    pub fn grace_period(&self, now: Timestamp) -> GracePeriod {
        let expiry_date = self
            .end_date
            .add_days(i64::from(self.limits.grace_period_days));
        let is_in_grace_period = now.is_after(&self.end_date) && now.is_before(&expiry_date);
        GracePeriod {
            is_in_grace_period,
            days_remaining: if is_in_grace_period {
                now.whole_days_until(&expiry_date)
            } else {
                0
            },
            expiry_date,
        }
    }

    /// True when another enrollment would stay within quota.
    pub fn can_admit_enrollment(&self) -> bool {
        self.is_active()
            && !self
                .limits
                .enrollment_limit_reached(self.usage.current_enrollments, self.usage.monthly_enrollments)
    }

    /// True when another live-class attendance would stay within quota.
    pub fn can_admit_attendance(&self) -> bool {
        self.is_active() && !self.limits.attendance_limit_reached(self.usage.monthly_attendance)
    }

    /// Count one enrollment against both enrollment counters.
    ///
    /// # Errors
    ///
    /// `InvalidState` if not Active, `CapacityExceeded` if either counter is
    /// at quota. Counters are unchanged on error.
    pub fn record_enrollment(&mut self, now: Timestamp) -> Result<UsageCounters, DomainError> {
        self.ensure_active()?;
        if !self.can_admit_enrollment() {
            return Err(DomainError::new(
                ErrorCode::CapacityExceeded,
                format!(
                    "Enrollment quota of {} reached ({} current, {} this month)",
                    self.limits.enrollment_quota,
                    self.usage.current_enrollments,
                    self.usage.monthly_enrollments
                ),
            ));
        }
        self.usage.current_enrollments += 1;
        self.usage.monthly_enrollments += 1;
        self.updated_at = now;
        Ok(self.usage)
    }

    /// Count one live-class attendance.
    ///
    /// # Errors
    ///
    /// `InvalidState` if not Active, `CapacityExceeded` at quota.
    pub fn record_attendance(&mut self, now: Timestamp) -> Result<UsageCounters, DomainError> {
        self.ensure_active()?;
        if !self.can_admit_attendance() {
            return Err(DomainError::new(
                ErrorCode::CapacityExceeded,
                format!(
                    "Attendance quota of {} reached for this month",
                    self.limits.attendance_quota
                ),
            ));
        }
        self.usage.monthly_attendance += 1;
        self.updated_at = now;
        Ok(self.usage)
    }

    /// Give back one held enrollment. The monthly counter is left alone.
    pub fn release_enrollment(&mut self, now: Timestamp) {
        self.usage.current_enrollments = self.usage.current_enrollments.saturating_sub(1);
        self.updated_at = now;
    }

    /// Zero the monthly counters.
    pub fn reset_monthly_usage(&mut self, now: Timestamp) {
        self.usage.monthly_enrollments = 0;
        self.usage.monthly_attendance = 0;
        self.updated_at = now;
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidState,
                format!("Subscription {} is {}, not ACTIVE", self.id, self.status),
            ))
        }
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {} to {}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{InstitutionPlan, StudentPlan, TierCatalogData};
    use crate::domain::foundation::{InstitutionId, UserId};
    use proptest::prelude::*;

    fn catalog() -> &'static TierCatalogData {
        TierCatalogData::builtin()
    }

    fn student_tier(plan: StudentPlan) -> Tier {
        Tier::Student(catalog().student_tier(plan).unwrap().clone())
    }

    fn institution_tier(plan: InstitutionPlan) -> Tier {
        Tier::Institution(catalog().institution_tier(plan).unwrap().clone())
    }

    fn student_sub(plan: StudentPlan) -> Subscription {
        Subscription::create_paid(
            Subject::Student(UserId::new()),
            &student_tier(plan),
            Timestamp::now(),
        )
    }

    // ════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn paid_subscription_copies_tier_limits() {
        let sub = student_sub(StudentPlan::Basic);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.limits.enrollment_quota, 5);
        assert_eq!(sub.amount, Money::from_cents(999));
        assert_eq!(sub.origin, SubscriptionOrigin::Regular);
        assert!(sub.auto_renew);
    }

    #[test]
    fn fallback_references_original_and_is_free() {
        let now = Timestamp::now();
        let trial = Subscription::create_trial(
            Subject::Student(UserId::new()),
            &student_tier(StudentPlan::Premium),
            now.minus_days(20),
            14,
        );
        let fallback =
            Subscription::create_fallback(&trial, &student_tier(StudentPlan::Free), now, 365);

        assert_eq!(
            fallback.origin,
            SubscriptionOrigin::Fallback {
                original_id: trial.id
            }
        );
        assert_eq!(fallback.subject, trial.subject);
        assert_eq!(fallback.amount, Money::ZERO);
        assert_eq!(fallback.end_date, now.add_days(365));
        assert!(!fallback.auto_renew);
    }

    #[test]
    fn trial_lapses_at_end_date() {
        let now = Timestamp::now();
        let trial = Subscription::create_trial(
            Subject::Student(UserId::new()),
            &student_tier(StudentPlan::Basic),
            now.minus_days(14),
            14,
        );
        assert!(trial.trial_has_lapsed(now));
        assert!(!trial.trial_has_lapsed(now.minus_days(1)));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Quota admission
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn enrollment_at_quota_is_rejected_not_clamped() {
        let mut sub = student_sub(StudentPlan::Basic);
        let now = Timestamp::now();
        for _ in 0..5 {
            sub.record_enrollment(now).unwrap();
        }
        let err = sub.record_enrollment(now).unwrap_err();
        assert_eq!(err.code, ErrorCode::CapacityExceeded);
        assert_eq!(sub.usage.current_enrollments, 5);
        assert_eq!(sub.usage.monthly_enrollments, 5);
    }

    #[test]
    fn monthly_counter_blocks_even_after_release() {
        let mut sub = student_sub(StudentPlan::Basic);
        let now = Timestamp::now();
        for _ in 0..5 {
            sub.record_enrollment(now).unwrap();
        }
        sub.release_enrollment(now);
        assert_eq!(sub.usage.current_enrollments, 4);
        assert!(!sub.can_admit_enrollment());

        sub.reset_monthly_usage(now);
        assert!(sub.can_admit_enrollment());
    }

    #[test]
    fn inactive_subscription_admits_nothing() {
        let mut sub = student_sub(StudentPlan::Pro);
        sub.cancel(Timestamp::now()).unwrap();
        let err = sub.record_attendance(Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn attendance_respects_quota() {
        let mut sub = student_sub(StudentPlan::Free);
        let now = Timestamp::now();
        for _ in 0..4 {
            sub.record_attendance(now).unwrap();
        }
        assert!(sub.record_attendance(now).is_err());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn reactivate_requires_cancelled() {
        let mut sub = student_sub(StudentPlan::Basic);
        let err = sub.reactivate(Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn reactivate_opens_fresh_window() {
        let mut sub = student_sub(StudentPlan::Basic);
        let later = Timestamp::now().add_days(3);
        sub.cancel(Timestamp::now()).unwrap();
        assert!(!sub.auto_renew);

        sub.reactivate(later).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.start_date, later);
        assert_eq!(sub.end_date, later.add_days(30));
        assert!(sub.auto_renew);
        assert!(sub.cancelled_at.is_none());
    }

    #[test]
    fn expired_cannot_be_cancelled() {
        let mut sub = student_sub(StudentPlan::Basic);
        sub.expire(Timestamp::now()).unwrap();
        let err = sub.cancel(Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn apply_tier_rejects_other_family() {
        let mut sub = student_sub(StudentPlan::Basic);
        let err = sub
            .apply_tier(&institution_tier(InstitutionPlan::Starter), Timestamp::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(sub.plan, PlanType::Student(StudentPlan::Basic));
    }

    #[test]
    fn apply_tier_copies_new_quotas() {
        let mut sub = student_sub(StudentPlan::Basic);
        sub.apply_tier(&student_tier(StudentPlan::Premium), Timestamp::now())
            .unwrap();
        assert_eq!(sub.plan, PlanType::Student(StudentPlan::Premium));
        assert_eq!(sub.limits.enrollment_quota, 15);
        assert_eq!(sub.amount, Money::from_cents(1999));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Proration and grace
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn upgrade_proration_charges_difference_for_remaining_days() {
        let start = Timestamp::now();
        let sub = Subscription::create_paid(
            Subject::Student(UserId::new()),
            &student_tier(StudentPlan::Basic),
            start,
        );
        // 15 of 30 days remain: 1999*15/30 - 999*15/30 = 999 - 499
        let charge = sub.upgrade_proration(&student_tier(StudentPlan::Premium), start.add_days(15));
        assert_eq!(charge, Money::from_cents(500));
    }

    #[test]
    fn downward_proration_floors_at_zero() {
        let sub = student_sub(StudentPlan::Pro);
        let charge = sub.upgrade_proration(&student_tier(StudentPlan::Basic), Timestamp::now());
        assert_eq!(charge, Money::ZERO);
    }

    #[test]
    fn grace_period_is_open_interval_after_end() {
        let sub = student_sub(StudentPlan::Premium);
        let grace_days = i64::from(sub.limits.grace_period_days);

        let before = sub.grace_period(sub.end_date.minus_days(1));
        assert!(!before.is_in_grace_period);
        assert_eq!(before.days_remaining, 0);

        let during = sub.grace_period(sub.end_date.add_days(2));
        assert!(during.is_in_grace_period);
        assert_eq!(during.days_remaining, (grace_days - 2) as u32);
        assert_eq!(during.expiry_date, sub.end_date.add_days(grace_days));

        let at_end = sub.grace_period(sub.end_date);
        assert!(!at_end.is_in_grace_period);
    }

    #[test]
    fn free_tier_has_no_grace() {
        let sub = student_sub(StudentPlan::Free);
        let view = sub.grace_period(sub.end_date.add_hours(1));
        assert!(!view.is_in_grace_period);
    }

    #[test]
    fn institution_subscription_uses_institution_limits() {
        let sub = Subscription::create_paid(
            Subject::Institution(InstitutionId::new()),
            &institution_tier(InstitutionPlan::Starter),
            Timestamp::now(),
        );
        assert_eq!(sub.limits.enrollment_quota, 100);
        assert_eq!(sub.limits.max_live_classes, 10);
    }

    proptest! {
        #[test]
        fn proration_is_never_negative(days_in in 0i64..40) {
            let sub = student_sub(StudentPlan::Premium);
            for plan in StudentPlan::ALL {
                let charge = sub.upgrade_proration(&student_tier(plan), sub.start_date.add_days(days_in));
                prop_assert!(charge >= Money::ZERO);
            }
        }
    }
}
