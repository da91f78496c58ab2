//! Quota & usage tracking.

mod reset_monthly_quotas;
mod tracker;

pub use reset_monthly_quotas::{ResetMonthlyQuotasHandler, ResetMonthlyQuotasResult};
pub use tracker::{AdmissionCheck, QuotaTracker};
