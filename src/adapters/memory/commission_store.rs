//! In-memory commission ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::commission::{CommissionRecord, CommissionStatus, Payout};
use crate::domain::foundation::{
    CommissionId, DomainError, ErrorCode, InstitutionId, PaymentId, Timestamp,
};
use crate::ports::CommissionRepository;

#[derive(Debug, Default)]
struct Ledger {
    by_payment: HashMap<PaymentId, CommissionRecord>,
    payouts: Vec<Payout>,
}

/// In-memory commission records and payouts, keyed by payment id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommissionRepository {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryCommissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_payment(&self, payment_id: PaymentId) -> bool {
        self.ledger.read().await.by_payment.contains_key(&payment_id)
    }

    pub async fn record_count(&self) -> usize {
        self.ledger.read().await.by_payment.len()
    }

    fn sorted(mut records: Vec<CommissionRecord>) -> Vec<CommissionRecord> {
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl CommissionRepository for InMemoryCommissionRepository {
    async fn upsert(&self, record: &CommissionRecord) -> Result<CommissionRecord, DomainError> {
        let mut ledger = self.ledger.write().await;
        let stored = match ledger.by_payment.get(&record.payment_id) {
            Some(existing) => CommissionRecord {
                id: existing.id,
                created_at: existing.created_at,
                ..record.clone()
            },
            None => record.clone(),
        };
        ledger.by_payment.insert(record.payment_id, stored.clone());
        Ok(stored)
    }

    async fn find_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<CommissionRecord>, DomainError> {
        Ok(self.ledger.read().await.by_payment.get(&payment_id).cloned())
    }

    async fn list_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let ledger = self.ledger.read().await;
        Ok(Self::sorted(
            ledger
                .by_payment
                .values()
                .filter(|r| r.institution_id == institution_id)
                .cloned()
                .collect(),
        ))
    }

    async fn pending_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let ledger = self.ledger.read().await;
        Ok(Self::sorted(
            ledger
                .by_payment
                .values()
                .filter(|r| r.institution_id == institution_id && r.is_pending())
                .cloned()
                .collect(),
        ))
    }

    async fn list_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let ledger = self.ledger.read().await;
        Ok(Self::sorted(
            ledger
                .by_payment
                .values()
                .filter(|r| r.created_at >= from && r.created_at < to)
                .cloned()
                .collect(),
        ))
    }

    async fn settle(
        &self,
        payout: &Payout,
        commission_ids: &[CommissionId],
    ) -> Result<(), DomainError> {
        let mut ledger = self.ledger.write().await;
        let settleable = commission_ids.iter().all(|id| {
            ledger
                .by_payment
                .values()
                .any(|r| r.id == *id && r.status == CommissionStatus::Pending)
        });
        if !settleable {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Commissions changed while the payout was being prepared",
            ));
        }
        for record in ledger
            .by_payment
            .values_mut()
            .filter(|r| commission_ids.contains(&r.id))
        {
            record.mark_paid(payout.id, payout.created_at);
        }
        ledger.payouts.push(payout.clone());
        Ok(())
    }

    async fn payouts_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Payout>, DomainError> {
        Ok(self
            .ledger
            .read()
            .await
            .payouts
            .iter()
            .filter(|p| p.institution_id == institution_id)
            .cloned()
            .collect())
    }
}
