//! TierCatalog port - read access to subscription and commission tiers.

use async_trait::async_trait;

use crate::domain::catalog::{
    CommissionTier, InstitutionPlan, InstitutionTier, StudentPlan, StudentTier, Tier,
};
use crate::domain::foundation::{DomainError, TierId};

/// Read-only tier definitions.
///
/// Implementations guarantee exactly one active commission tier per
/// institution plan.
#[async_trait]
pub trait TierCatalog: Send + Sync {
    /// Find any tier by id. Returns `None` for unknown or inactive tiers.
    async fn find_tier(&self, id: TierId) -> Result<Option<Tier>, DomainError>;

    async fn student_tier(&self, plan: StudentPlan) -> Result<Option<StudentTier>, DomainError>;

    async fn institution_tier(
        &self,
        plan: InstitutionPlan,
    ) -> Result<Option<InstitutionTier>, DomainError>;

    /// The active commission tier for an institution plan.
    async fn commission_tier(
        &self,
        plan: InstitutionPlan,
    ) -> Result<Option<CommissionTier>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_catalog_is_object_safe() {
        fn _accepts_dyn(_catalog: &dyn TierCatalog) {}
    }
}
