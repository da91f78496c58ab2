//! Subscription lifecycle handlers.
//!
//! Every mutation writes a `SubscriptionLog` row. Scheduled changes only
//! write the log row; the row names the plan and the date it takes effect.

mod cancel_subscription;
mod downgrade_subscription;
mod get_grace_period;
mod handle_trial_expiration;
mod process_expired_trials;
mod reactivate_subscription;
mod upgrade_subscription;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use downgrade_subscription::{
    DowngradeSubscriptionCommand, DowngradeSubscriptionHandler, DowngradeSubscriptionResult,
};
pub use get_grace_period::{GetGracePeriodHandler, GetGracePeriodQuery};
pub use handle_trial_expiration::{
    HandleTrialExpirationCommand, HandleTrialExpirationHandler, TrialExpirationResult,
    TrialFallbackPolicy,
};
pub use process_expired_trials::ProcessExpiredTrialsHandler;
pub use reactivate_subscription::{
    ReactivateSubscriptionCommand, ReactivateSubscriptionHandler, ReactivateSubscriptionResult,
};
pub use upgrade_subscription::{
    UpgradeSubscriptionCommand, UpgradeSubscriptionHandler, UpgradeSubscriptionResult,
};
