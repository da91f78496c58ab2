//! Append-only audit trail port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::{BillingRecord, SubscriptionLog};

/// Writes lifecycle log entries and billing history. Rows are never updated.
#[async_trait]
pub trait SubscriptionLogWriter: Send + Sync {
    async fn append(&self, entry: &SubscriptionLog) -> Result<(), DomainError>;

    async fn append_billing(&self, record: &BillingRecord) -> Result<(), DomainError>;

    /// Log entries of one subscription, oldest first.
    async fn entries_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<SubscriptionLog>, DomainError>;

    /// Billing rows of one subscription, oldest first.
    async fn billing_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<BillingRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_log_writer_is_object_safe() {
        fn _accepts_dyn(_writer: &dyn SubscriptionLogWriter) {}
    }
}
