//! Tier catalog domain module.
//!
//! Static definitions of subscription tiers, their quotas and prices, and
//! the commission rate charged to institutions on each plan.
//!
//! # Module Structure
//!
//! - `plan` - Student and institution plan enums
//! - `billing_cycle` - Billing period lengths and proration
//! - `quota_limits` - Limits copied onto subscriptions
//! - `tier` - Tier definitions
//! - `commission_tier` - Commission rate per institution plan
//! - `catalog_data` - Catalog contents, invariants and built-in defaults

mod billing_cycle;
mod catalog_data;
mod commission_tier;
mod plan;
mod quota_limits;
mod tier;

pub use billing_cycle::BillingCycle;
pub use catalog_data::TierCatalogData;
pub use commission_tier::CommissionTier;
pub use plan::{InstitutionPlan, PlanType, StudentPlan};
pub use quota_limits::QuotaLimits;
pub use tier::{InstitutionTier, StudentTier, Tier};
