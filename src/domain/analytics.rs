//! Read models for usage and commission reporting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::catalog::PlanType;
use crate::domain::commission::CommissionRecord;
use crate::domain::foundation::{InstitutionId, Money, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{GracePeriod, QuotaReading, Subject, SubscriptionStatus};

/// A student's usage against the quotas of their current subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDashboard {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub plan: PlanType,
    pub status: SubscriptionStatus,
    pub readings: Vec<QuotaReading>,
    pub alerts: Vec<String>,
    pub grace_period: GracePeriod,
}

/// One threshold alert for one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageAlert {
    pub subject: Subject,
    pub subscription_id: SubscriptionId,
    pub message: String,
}

/// Commission totals of one institution within a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionCommissionLine {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub payment_count: u32,
    pub payment_total: Money,
    pub commission_total: Money,
    pub institution_share_total: Money,
    pub pending_total: Money,
    pub paid_total: Money,
}

/// Platform-wide commissions for `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionReport {
    pub from: Timestamp,
    pub to: Timestamp,
    pub payment_count: u32,
    pub payment_total: Money,
    pub commission_total: Money,
    pub institution_share_total: Money,
    /// Sorted by `commission_total`, largest first.
    pub institutions: Vec<InstitutionCommissionLine>,
}

impl CommissionReport {
    /// Aggregate `records`; `names` supplies display names, missing ones
    /// show as "Unknown institution".
    pub fn build(
        from: Timestamp,
        to: Timestamp,
        records: &[CommissionRecord],
        names: &HashMap<InstitutionId, String>,
    ) -> Self {
        let mut lines: HashMap<InstitutionId, InstitutionCommissionLine> = HashMap::new();
        for record in records {
            let line = lines
                .entry(record.institution_id)
                .or_insert_with(|| InstitutionCommissionLine {
                    institution_id: record.institution_id,
                    institution_name: names
                        .get(&record.institution_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown institution".to_string()),
                    payment_count: 0,
                    payment_total: Money::ZERO,
                    commission_total: Money::ZERO,
                    institution_share_total: Money::ZERO,
                    pending_total: Money::ZERO,
                    paid_total: Money::ZERO,
                });
            line.payment_count += 1;
            line.payment_total = line.payment_total + record.payment_amount;
            line.commission_total = line.commission_total + record.commission_amount;
            line.institution_share_total = line.institution_share_total + record.institution_share;
            if record.is_pending() {
                line.pending_total = line.pending_total + record.commission_amount;
            } else {
                line.paid_total = line.paid_total + record.commission_amount;
            }
        }

        let mut institutions: Vec<InstitutionCommissionLine> = lines.into_values().collect();
        institutions.sort_by(|a, b| {
            b.commission_total
                .cmp(&a.commission_total)
                .then_with(|| a.institution_name.cmp(&b.institution_name))
        });

        Self {
            from,
            to,
            payment_count: records.len() as u32,
            payment_total: records.iter().map(|r| r.payment_amount).sum(),
            commission_total: records.iter().map(|r| r.commission_amount).sum(),
            institution_share_total: records.iter().map(|r| r.institution_share).sum(),
            institutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commission::CommissionBreakdown;
    use crate::domain::foundation::{CommissionRate, PaymentId, PayoutId};

    fn record(institution: InstitutionId, cents: i64, pct: u8) -> CommissionRecord {
        CommissionRecord::pending(
            institution,
            PaymentId::new(),
            CommissionBreakdown::compute(Money::from_cents(cents), CommissionRate::whole_percent(pct)),
            Timestamp::now(),
        )
    }

    #[test]
    fn lines_sort_by_commission_descending() {
        let small = InstitutionId::new();
        let large = InstitutionId::new();
        let mut paid = record(large, 50_000, 15);
        paid.mark_paid(PayoutId::new(), Timestamp::now());
        let records = vec![record(small, 10_000, 25), paid, record(large, 10_000, 15)];
        let names = HashMap::from([(small, "Small".to_string())]);

        let report = CommissionReport::build(Timestamp::now(), Timestamp::now(), &records, &names);

        assert_eq!(report.payment_count, 3);
        assert_eq!(report.commission_total, Money::from_cents(11_500));
        assert_eq!(report.institutions[0].institution_id, large);
        assert_eq!(report.institutions[0].commission_total, Money::from_cents(9_000));
        assert_eq!(report.institutions[0].paid_total, Money::from_cents(7_500));
        assert_eq!(report.institutions[0].institution_name, "Unknown institution");
        assert_eq!(report.institutions[1].institution_name, "Small");
    }

    #[test]
    fn empty_window_has_zero_totals() {
        let report =
            CommissionReport::build(Timestamp::now(), Timestamp::now(), &[], &HashMap::new());
        assert_eq!(report.commission_total, Money::ZERO);
        assert!(report.institutions.is_empty());
    }
}
