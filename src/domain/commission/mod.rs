//! Commission domain - per-payment commission ledger and payouts.

mod errors;
mod payout;
mod record;

pub use errors::CommissionError;
pub use payout::{Payout, PayoutMethod, PayoutStatus};
pub use record::{CommissionBreakdown, CommissionRecord, CommissionStatus, CommissionSummary};
