//! Lifecycle change - everything one lifecycle action writes.
//!
//! Cancel, reactivate, immediate upgrade and trial expiry each touch more
//! than one table: subscription rows, the institution's stored commission
//! rate and the audit trail. A [`LifecycleChange`] collects those writes so
//! the repository can commit them as one unit.

use crate::domain::foundation::{CommissionRate, InstitutionId};

use super::{BillingRecord, Subscription, SubscriptionLog};

#[derive(Debug, Clone, Default)]
pub struct LifecycleChange {
    /// Existing rows to overwrite. Usage counters are never taken from these.
    pub updated: Vec<Subscription>,
    /// New rows.
    pub inserted: Vec<Subscription>,
    pub commission_rate: Option<(InstitutionId, CommissionRate)>,
    pub log: Vec<SubscriptionLog>,
    pub billing: Vec<BillingRecord>,
}

impl LifecycleChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, subscription: &Subscription) -> Self {
        self.updated.push(subscription.clone());
        self
    }

    pub fn insert(mut self, subscription: &Subscription) -> Self {
        self.inserted.push(subscription.clone());
        self
    }

    pub fn set_commission_rate(mut self, institution: InstitutionId, rate: CommissionRate) -> Self {
        self.commission_rate = Some((institution, rate));
        self
    }

    pub fn log(mut self, entry: SubscriptionLog) -> Self {
        self.log.push(entry);
        self
    }

    pub fn bill(mut self, record: BillingRecord) -> Self {
        self.billing.push(record);
        self
    }
}
