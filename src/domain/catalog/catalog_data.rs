//! Tier catalog contents and the built-in default catalog.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::domain::foundation::{CommissionRate, Money, TierId, ValidationError};

use super::{
    BillingCycle, CommissionTier, InstitutionPlan, InstitutionTier, StudentPlan, StudentTier, Tier,
};

/// Every tier and commission tier known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCatalogData {
    pub student_tiers: Vec<StudentTier>,
    pub institution_tiers: Vec<InstitutionTier>,
    pub commission_tiers: Vec<CommissionTier>,
}

impl TierCatalogData {
    /// Checks catalog invariants.
    ///
    /// - Tier ids are unique across both families
    /// - Every institution plan has exactly one active commission tier
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let ids = self
            .student_tiers
            .iter()
            .map(|t| t.id)
            .chain(self.institution_tiers.iter().map(|t| t.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(ValidationError::invalid_format(
                    "tier_id",
                    format!("duplicate tier id {}", id),
                ));
            }
        }

        for plan in InstitutionPlan::ALL {
            let active = self
                .commission_tiers
                .iter()
                .filter(|c| c.plan == plan && c.is_active)
                .count();
            if active != 1 {
                return Err(ValidationError::invalid_format(
                    "commission_tiers",
                    format!(
                        "plan {} must have exactly one active commission tier, found {}",
                        plan.as_str(),
                        active
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: TierId) -> Option<Tier> {
        self.student_tiers
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .map(Tier::Student)
            .or_else(|| {
                self.institution_tiers
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .map(Tier::Institution)
            })
    }

    pub fn student_tier(&self, plan: StudentPlan) -> Option<&StudentTier> {
        self.student_tiers
            .iter()
            .find(|t| t.plan == plan && t.is_active)
    }

    pub fn institution_tier(&self, plan: InstitutionPlan) -> Option<&InstitutionTier> {
        self.institution_tiers
            .iter()
            .find(|t| t.plan == plan && t.is_active)
    }

    pub fn commission_tier(&self, plan: InstitutionPlan) -> Option<&CommissionTier> {
        self.commission_tiers
            .iter()
            .find(|c| c.plan == plan && c.is_active)
    }

    /// The catalog shipped with the platform.
    pub fn builtin() -> &'static TierCatalogData {
        &BUILTIN_CATALOG
    }
}

fn fixed_id(n: u128) -> TierId {
    TierId::from_uuid(Uuid::from_u128(0x6c69_6e67_7561_0000_0000_0000_0000_0000 | n))
}

fn features(enabled: &[&str]) -> BTreeMap<String, bool> {
    enabled.iter().map(|f| (f.to_string(), true)).collect()
}

#[allow(clippy::too_many_arguments)]
fn student(
    n: u128,
    plan: StudentPlan,
    name: &str,
    price_cents: i64,
    enrollment_quota: u32,
    attendance_quota: u32,
    grace_period_days: u32,
    max_live_classes: u32,
    enabled: &[&str],
) -> StudentTier {
    StudentTier {
        id: fixed_id(n),
        plan,
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        billing_cycle: BillingCycle::Monthly,
        enrollment_quota,
        attendance_quota,
        grace_period_days,
        max_live_classes,
        features: features(enabled),
        is_active: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn institution(
    n: u128,
    plan: InstitutionPlan,
    name: &str,
    price_cents: i64,
    max_students: u32,
    max_courses: u32,
    max_live_classes: u32,
    grace_period_days: u32,
    enabled: &[&str],
) -> InstitutionTier {
    InstitutionTier {
        id: fixed_id(n),
        plan,
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        billing_cycle: BillingCycle::Monthly,
        max_students,
        max_courses,
        max_live_classes,
        grace_period_days,
        features: features(enabled),
        is_active: true,
    }
}

fn commission(plan: InstitutionPlan, pct: u8) -> CommissionTier {
    CommissionTier {
        plan,
        rate: CommissionRate::whole_percent(pct),
        is_active: true,
    }
}

static BUILTIN_CATALOG: Lazy<TierCatalogData> = Lazy::new(|| TierCatalogData {
    student_tiers: vec![
        student(1, StudentPlan::Free, "Free", 0, 2, 4, 0, 0, &["self_paced"]),
        student(2, StudentPlan::Basic, "Basic", 999, 5, 20, 3, 2, &["self_paced", "live_classes"]),
        student(
            3,
            StudentPlan::Premium,
            "Premium",
            1_999,
            15,
            60,
            7,
            5,
            &["self_paced", "live_classes", "certificates"],
        ),
        student(
            4,
            StudentPlan::Pro,
            "Pro",
            3_999,
            50,
            200,
            14,
            20,
            &["self_paced", "live_classes", "certificates", "tutoring"],
        ),
    ],
    institution_tiers: vec![
        institution(11, InstitutionPlan::Starter, "Starter", 4_900, 100, 10, 10, 7, &["course_builder"]),
        institution(
            12,
            InstitutionPlan::Professional,
            "Professional",
            14_900,
            1_000,
            50,
            50,
            14,
            &["course_builder", "analytics", "live_classes"],
        ),
        institution(
            13,
            InstitutionPlan::Enterprise,
            "Enterprise",
            49_900,
            10_000,
            500,
            500,
            30,
            &["course_builder", "analytics", "live_classes", "white_label"],
        ),
    ],
    commission_tiers: vec![
        commission(InstitutionPlan::Starter, 25),
        commission(InstitutionPlan::Professional, 20),
        commission(InstitutionPlan::Enterprise, 15),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        assert!(TierCatalogData::builtin().validate().is_ok());
    }

    #[test]
    fn builtin_catalog_has_every_plan() {
        let catalog = TierCatalogData::builtin();
        for plan in StudentPlan::ALL {
            assert!(catalog.student_tier(plan).is_some(), "missing {:?}", plan);
        }
        for plan in InstitutionPlan::ALL {
            assert!(catalog.institution_tier(plan).is_some(), "missing {:?}", plan);
            assert!(catalog.commission_tier(plan).is_some(), "missing {:?}", plan);
        }
    }

    #[test]
    fn builtin_commission_rates() {
        let catalog = TierCatalogData::builtin();
        let starter = catalog.commission_tier(InstitutionPlan::Starter).unwrap();
        assert_eq!(starter.rate.bps(), 2_500);
        let enterprise = catalog.commission_tier(InstitutionPlan::Enterprise).unwrap();
        assert_eq!(enterprise.rate.bps(), 1_500);
    }

    #[test]
    fn find_resolves_both_families() {
        let catalog = TierCatalogData::builtin();
        let basic_id = catalog.student_tier(StudentPlan::Basic).unwrap().id;
        let starter_id = catalog.institution_tier(InstitutionPlan::Starter).unwrap().id;

        assert!(matches!(catalog.find(basic_id), Some(Tier::Student(_))));
        assert!(matches!(catalog.find(starter_id), Some(Tier::Institution(_))));
        assert!(catalog.find(TierId::new()).is_none());
    }

    #[test]
    fn duplicate_commission_tier_is_rejected() {
        let mut catalog = TierCatalogData::builtin().clone();
        catalog
            .commission_tiers
            .push(commission(InstitutionPlan::Starter, 30));
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn missing_commission_tier_is_rejected() {
        let mut catalog = TierCatalogData::builtin().clone();
        catalog
            .commission_tiers
            .retain(|c| c.plan != InstitutionPlan::Enterprise);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn duplicate_tier_id_is_rejected() {
        let mut catalog = TierCatalogData::builtin().clone();
        let dup = catalog.student_tiers[0].clone();
        catalog.student_tiers.push(dup);
        assert!(catalog.validate().is_err());
    }
}
