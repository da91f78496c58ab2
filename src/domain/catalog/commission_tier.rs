//! Commission tiers.
//!
//! Each institution plan has exactly one active commission tier giving the
//! platform's share of that institution's course sales.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CommissionRate;

use super::InstitutionPlan;

/// Platform commission rate for one institution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub plan: InstitutionPlan,
    pub rate: CommissionRate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
