//! Tier definitions.
//!
//! Tiers are the priced, quota-carrying entries of the catalog. Students and
//! institutions have separate tier shapes; commission rates for institution
//! plans live on [`CommissionTier`](super::CommissionTier).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Money, TierId};

use super::{BillingCycle, InstitutionPlan, PlanType, QuotaLimits, StudentPlan};

/// Tier a student can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentTier {
    pub id: TierId,
    pub plan: StudentPlan,
    pub name: String,
    pub price: Money,
    pub billing_cycle: BillingCycle,
    pub enrollment_quota: u32,
    pub attendance_quota: u32,
    pub grace_period_days: u32,
    pub max_live_classes: u32,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Tier an institution can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionTier {
    pub id: TierId,
    pub plan: InstitutionPlan,
    pub name: String,
    pub price: Money,
    pub billing_cycle: BillingCycle,
    pub max_students: u32,
    pub max_courses: u32,
    pub max_live_classes: u32,
    pub grace_period_days: u32,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Any catalog tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Tier {
    Student(StudentTier),
    Institution(InstitutionTier),
}

impl Tier {
    pub fn id(&self) -> TierId {
        match self {
            Tier::Student(t) => t.id,
            Tier::Institution(t) => t.id,
        }
    }

    pub fn plan(&self) -> PlanType {
        match self {
            Tier::Student(t) => PlanType::Student(t.plan),
            Tier::Institution(t) => PlanType::Institution(t.plan),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tier::Student(t) => &t.name,
            Tier::Institution(t) => &t.name,
        }
    }

    pub fn price(&self) -> Money {
        match self {
            Tier::Student(t) => t.price,
            Tier::Institution(t) => t.price,
        }
    }

    pub fn billing_cycle(&self) -> BillingCycle {
        match self {
            Tier::Student(t) => t.billing_cycle,
            Tier::Institution(t) => t.billing_cycle,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Tier::Student(t) => t.is_active,
            Tier::Institution(t) => t.is_active,
        }
    }

    pub fn features(&self) -> &BTreeMap<String, bool> {
        match self {
            Tier::Student(t) => &t.features,
            Tier::Institution(t) => &t.features,
        }
    }

    /// Limits copied onto a subscription placed on this tier.
    ///
    /// Institution tiers express enrollment capacity as `max_students` and
    /// carry no attendance quota.
    pub fn limits(&self) -> QuotaLimits {
        match self {
            Tier::Student(t) => QuotaLimits {
                enrollment_quota: t.enrollment_quota,
                attendance_quota: t.attendance_quota,
                max_live_classes: t.max_live_classes,
                grace_period_days: t.grace_period_days,
            },
            Tier::Institution(t) => QuotaLimits {
                enrollment_quota: t.max_students,
                attendance_quota: 0,
                max_live_classes: t.max_live_classes,
                grace_period_days: t.grace_period_days,
            },
        }
    }

    /// Price of one day on this tier, prorated over `days`.
    pub fn prorated_price(&self, days: u32) -> Money {
        self.billing_cycle().prorate(self.price(), days)
    }
}
