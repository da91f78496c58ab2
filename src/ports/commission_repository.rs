//! Commission ledger port.

use async_trait::async_trait;

use crate::domain::commission::{CommissionRecord, Payout};
use crate::domain::foundation::{CommissionId, DomainError, InstitutionId, PaymentId, Timestamp};

/// Repository port for commission records and payouts.
#[async_trait]
pub trait CommissionRepository: Send + Sync {
    /// Insert or update the record for `record.payment_id`.
    ///
    /// At most one record exists per payment. On update the stored id and
    /// `created_at` are kept and amounts, rate and `updated_at` replaced.
    /// Returns the stored row.
    async fn upsert(&self, record: &CommissionRecord) -> Result<CommissionRecord, DomainError>;

    async fn find_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<CommissionRecord>, DomainError>;

    async fn list_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError>;

    async fn pending_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError>;

    /// Records created in `[from, to)`.
    async fn list_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CommissionRecord>, DomainError>;

    /// Insert `payout` and mark every listed commission Paid with its id,
    /// all in one transaction.
    ///
    /// # Errors
    ///
    /// - `Conflict` if any listed commission is no longer Pending; nothing
    ///   is written in that case
    async fn settle(
        &self,
        payout: &Payout,
        commission_ids: &[CommissionId],
    ) -> Result<(), DomainError>;

    async fn payouts_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Payout>, DomainError>;
}
