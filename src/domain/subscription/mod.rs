//! Subscription domain - per-subject subscription state and its audit trail.

mod aggregate;
mod audit;
mod change;
mod errors;
mod status;
mod subject;
mod usage;

pub use aggregate::{GracePeriod, Subscription};
pub use audit::{BillingRecord, LogAction, SubscriptionLog};
pub use change::LifecycleChange;
pub use errors::SubscriptionError;
pub use status::SubscriptionStatus;
pub use subject::{Subject, SubjectKind, SubscriptionOrigin};
pub use usage::{QuotaReading, QuotaStatus, UsageCounters, UsageMetric};
