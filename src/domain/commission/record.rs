//! Commission ledger entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommissionId, CommissionRate, InstitutionId, Money, PaymentId, PayoutId, Timestamp,
    ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "PENDING",
            CommissionStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(CommissionStatus::Pending),
            "PAID" => Ok(CommissionStatus::Paid),
            _ => Err(ValidationError::invalid_format(
                "commission_status",
                format!("unknown status '{}'", s),
            )),
        }
    }
}

/// Split of one payment between platform and institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub payment_amount: Money,
    pub rate: CommissionRate,
    pub commission_amount: Money,
    pub institution_share: Money,
}

impl CommissionBreakdown {
    /// `commission = amount × rate`, `share = amount − commission`.
    pub fn compute(payment_amount: Money, rate: CommissionRate) -> Self {
        let commission_amount = rate.apply(payment_amount);
        Self {
            payment_amount,
            rate,
            commission_amount,
            institution_share: payment_amount - commission_amount,
        }
    }
}

/// Per-payment commission ledger entry. At most one per payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: CommissionId,
    pub institution_id: InstitutionId,
    pub payment_id: PaymentId,
    pub payment_amount: Money,
    pub commission_amount: Money,
    pub institution_share: Money,
    /// Rate at the time of the last calculation.
    pub rate: CommissionRate,
    pub status: CommissionStatus,
    pub payout_id: Option<PayoutId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl CommissionRecord {
    pub fn pending(
        institution_id: InstitutionId,
        payment_id: PaymentId,
        breakdown: CommissionBreakdown,
        now: Timestamp,
    ) -> Self {
        Self {
            id: CommissionId::new(),
            institution_id,
            payment_id,
            payment_amount: breakdown.payment_amount,
            commission_amount: breakdown.commission_amount,
            institution_share: breakdown.institution_share,
            rate: breakdown.rate,
            status: CommissionStatus::Pending,
            payout_id: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CommissionStatus::Pending
    }

    /// Overwrite the amounts with a fresh calculation.
    pub fn apply_breakdown(&mut self, breakdown: CommissionBreakdown, now: Timestamp) {
        self.payment_amount = breakdown.payment_amount;
        self.commission_amount = breakdown.commission_amount;
        self.institution_share = breakdown.institution_share;
        self.rate = breakdown.rate;
        self.updated_at = now;
    }

    pub fn mark_paid(&mut self, payout_id: PayoutId, now: Timestamp) {
        self.status = CommissionStatus::Paid;
        self.payout_id = Some(payout_id);
        self.paid_at = Some(now);
        self.updated_at = now;
    }
}

/// Pending and paid totals of one institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub institution_id: InstitutionId,
    pub current_rate: CommissionRate,
    pub pending_amount: Money,
    pub pending_count: u32,
    pub paid_amount: Money,
    pub paid_count: u32,
}

impl CommissionSummary {
    pub fn from_records(
        institution_id: InstitutionId,
        current_rate: CommissionRate,
        records: &[CommissionRecord],
    ) -> Self {
        let (pending, paid): (Vec<&CommissionRecord>, Vec<&CommissionRecord>) =
            records.iter().partition(|r| r.is_pending());
        Self {
            institution_id,
            current_rate,
            pending_amount: pending.iter().map(|r| r.commission_amount).sum(),
            pending_count: pending.len() as u32,
            paid_amount: paid.iter().map(|r| r.commission_amount).sum(),
            paid_count: paid.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn breakdown_splits_payment() {
        let b = CommissionBreakdown::compute(
            Money::from_cents(10_000),
            CommissionRate::percent(20).unwrap(),
        );
        assert_eq!(b.commission_amount, Money::from_cents(2_000));
        assert_eq!(b.institution_share, Money::from_cents(8_000));
    }

    #[test]
    fn mark_paid_stamps_payout() {
        let now = Timestamp::now();
        let b = CommissionBreakdown::compute(Money::from_cents(500), CommissionRate::percent(25).unwrap());
        let mut record = CommissionRecord::pending(InstitutionId::new(), PaymentId::new(), b, now);
        let payout = PayoutId::new();
        record.mark_paid(payout, now);
        assert_eq!(record.status, CommissionStatus::Paid);
        assert_eq!(record.payout_id, Some(payout));
    }

    #[test]
    fn summary_partitions_by_status() {
        let now = Timestamp::now();
        let inst = InstitutionId::new();
        let rate = CommissionRate::percent(20).unwrap();
        let mut records: Vec<CommissionRecord> = [1_000, 2_000, 3_000]
            .into_iter()
            .map(|c| {
                CommissionRecord::pending(
                    inst,
                    PaymentId::new(),
                    CommissionBreakdown::compute(Money::from_cents(c), rate),
                    now,
                )
            })
            .collect();
        records[0].mark_paid(PayoutId::new(), now);

        let summary = CommissionSummary::from_records(inst, rate, &records);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.paid_amount, Money::from_cents(200));
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.pending_amount, Money::from_cents(1_000));
    }

    proptest! {
        #[test]
        fn split_always_sums_to_payment(cents in 0i64..100_000_000, bps in 0u32..=10_000) {
            let b = CommissionBreakdown::compute(
                Money::from_cents(cents),
                CommissionRate::from_bps(bps).unwrap(),
            );
            prop_assert_eq!(b.commission_amount + b.institution_share, b.payment_amount);
            prop_assert!(b.institution_share >= Money::ZERO);
        }
    }
}
