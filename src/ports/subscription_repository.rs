//! Subscription repository port.
//!
//! Persists [`Subscription`] rows. Quota admission goes through the
//! `try_consume_*` methods, which must check and increment in one atomic
//! step so concurrent requests cannot push a counter past its quota.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::{LifecycleChange, Subject, Subscription, UsageCounters};

/// Repository port for subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription row.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Overwrite an existing subscription row.
    ///
    /// Plan, status, dates and limits are written; the usage counters are
    /// left as stored. They only move through the conditional methods below.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Commit every write of one lifecycle action as a single unit:
    /// row updates (as [`update`](Self::update)), inserts, the institution's
    /// stored commission rate, log entries and billing rows.
    ///
    /// Nothing is written when any part fails.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if an updated row doesn't exist
    /// - `Conflict` if an inserted id already exists
    /// - `InstitutionNotFound` if the rate targets an unknown institution
    /// - `DatabaseError` on persistence failure
    async fn commit(&self, change: &LifecycleChange) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// The subject's most recent subscription that is not Expired.
    async fn find_current(&self, subject: Subject) -> Result<Option<Subscription>, DomainError>;

    /// Trials with `end_date <= now`.
    async fn find_lapsed_trials(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError>;

    /// All Active subscriptions.
    async fn find_active(&self) -> Result<Vec<Subscription>, DomainError>;

    /// Atomically count one enrollment against both enrollment counters.
    ///
    /// Returns the new counters, or `None` when the subscription is not
    /// Active or either counter is already at quota. Nothing changes on
    /// `None`.
    async fn try_consume_enrollment(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError>;

    /// Atomically count one live-class attendance. `None` as above.
    async fn try_consume_attendance(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError>;

    /// Give back one held enrollment (`current_enrollments` only).
    async fn release_enrollment(&self, id: SubscriptionId) -> Result<(), DomainError>;

    /// Zero the monthly counters of every Active subscription.
    ///
    /// Returns the number of subscriptions reset.
    async fn reset_monthly_usage(&self) -> Result<u64, DomainError>;
}
