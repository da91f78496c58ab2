//! In-memory users, institutions and payments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::directory::{Institution, Payment, User};
use crate::domain::foundation::{
    CommissionRate, DomainError, ErrorCode, InstitutionId, PaymentId, UserId,
};
use crate::ports::{Directory, PaymentReader};

use super::InMemoryCommissionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    institutions: Arc<RwLock<HashMap<InstitutionId, Institution>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_institution(&self, institution: Institution) {
        self.institutions
            .write()
            .await
            .insert(institution.id, institution);
    }

    /// Overwrite the institution's stored commission rate.
    pub async fn set_commission_rate(
        &self,
        id: InstitutionId,
        rate: CommissionRate,
    ) -> Result<(), DomainError> {
        match self.institutions.write().await.get_mut(&id) {
            Some(institution) => {
                institution.commission_rate = Some(rate);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::InstitutionNotFound,
                format!("Institution not found: {}", id),
            )),
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_institution(&self, id: InstitutionId) -> Result<Option<Institution>, DomainError> {
        Ok(self.institutions.read().await.get(&id).cloned())
    }
}

/// In-memory payments. Reads the commission ledger to find payments that
/// still need a commission.
#[derive(Debug, Clone)]
pub struct InMemoryPayments {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
    commissions: InMemoryCommissionRepository,
}

impl InMemoryPayments {
    pub fn new(commissions: InMemoryCommissionRepository) -> Self {
        Self {
            payments: Arc::new(RwLock::new(HashMap::new())),
            commissions,
        }
    }

    pub async fn insert(&self, payment: Payment) {
        self.payments.write().await.insert(payment.id, payment);
    }
}

#[async_trait]
impl PaymentReader for InMemoryPayments {
    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_uncommissioned(&self) -> Result<Vec<Payment>, DomainError> {
        let completed: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.is_completed())
            .cloned()
            .collect();

        let mut pending = Vec::new();
        for payment in completed {
            if !self.commissions.has_payment(payment.id).await {
                pending.push(payment);
            }
        }
        pending.sort_by_key(|p| p.created_at);
        Ok(pending)
    }
}
