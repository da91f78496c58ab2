//! Tier catalog held in memory.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::catalog::{
    CommissionTier, InstitutionPlan, InstitutionTier, StudentPlan, StudentTier, Tier,
    TierCatalogData,
};
use crate::domain::foundation::{DomainError, TierId};
use crate::ports::TierCatalog;

/// Read-only catalog. Contents are validated on construction.
#[derive(Debug, Clone)]
pub struct StaticTierCatalog {
    data: Arc<TierCatalogData>,
}

impl StaticTierCatalog {
    /// Wrap catalog contents after checking their invariants.
    pub fn new(data: TierCatalogData) -> Result<Self, DomainError> {
        data.validate()?;
        Ok(Self {
            data: Arc::new(data),
        })
    }

    /// The catalog shipped with the platform.
    pub fn builtin() -> Self {
        Self {
            data: Arc::new(TierCatalogData::builtin().clone()),
        }
    }

    pub fn data(&self) -> &TierCatalogData {
        &self.data
    }
}

impl Default for StaticTierCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl TierCatalog for StaticTierCatalog {
    async fn find_tier(&self, id: TierId) -> Result<Option<Tier>, DomainError> {
        Ok(self.data.find(id))
    }

    async fn student_tier(&self, plan: StudentPlan) -> Result<Option<StudentTier>, DomainError> {
        Ok(self.data.student_tier(plan).cloned())
    }

    async fn institution_tier(
        &self,
        plan: InstitutionPlan,
    ) -> Result<Option<InstitutionTier>, DomainError> {
        Ok(self.data.institution_tier(plan).cloned())
    }

    async fn commission_tier(
        &self,
        plan: InstitutionPlan,
    ) -> Result<Option<CommissionTier>, DomainError> {
        Ok(self.data.commission_tier(plan).copied())
    }
}
