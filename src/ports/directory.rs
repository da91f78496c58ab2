//! Directory port - users, institutions and payments.
//!
//! These records belong to other parts of the platform. Governance only
//! reads them here; an institution's stored commission rate is written as
//! part of a lifecycle change (`SubscriptionRepository::commit`).

use async_trait::async_trait;

use crate::domain::directory::{Institution, Payment, User};
use crate::domain::foundation::{DomainError, InstitutionId, PaymentId, UserId};

#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, DomainError>;

    async fn find_institution(&self, id: InstitutionId) -> Result<Option<Institution>, DomainError>;
}

/// Read access to course payments.
#[async_trait]
pub trait PaymentReader: Send + Sync {
    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Completed payments that have no commission record yet.
    async fn find_uncommissioned(&self) -> Result<Vec<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn Directory) {}
    }

    #[test]
    fn payment_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn PaymentReader) {}
    }
}
