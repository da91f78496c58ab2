//! Commission engine handlers.
//!
//! Per-payment calculation is strict: every link of the payment chain must
//! resolve and the institution must be on an active plan with a commission
//! tier. Reporting queries are lenient and fall back to the institution's
//! stored rate, then the configured default.

mod calculate_commission;
mod calculate_pending_commissions;
mod get_commission_rate;
mod get_commission_summary;
mod get_subscription_status;
mod process_payout;
mod rate_resolution;
mod recalculate_institution_commissions;

pub use calculate_commission::{
    CalculateCommissionCommand, CalculateCommissionHandler, CalculateCommissionResult,
};
pub use calculate_pending_commissions::CalculatePendingCommissionsHandler;
pub use get_commission_rate::{GetCommissionRateHandler, GetCommissionRateQuery};
pub use get_commission_summary::{GetCommissionSummaryHandler, GetCommissionSummaryQuery};
pub use get_subscription_status::{
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, InstitutionSubscriptionStatus,
};
pub use process_payout::{ProcessPayoutCommand, ProcessPayoutHandler, ProcessPayoutResult};
pub use rate_resolution::{CommissionRateResolver, RateSource, ResolvedRate};
pub use recalculate_institution_commissions::{
    RecalculateInstitutionCommissionsCommand, RecalculateInstitutionCommissionsHandler,
};
