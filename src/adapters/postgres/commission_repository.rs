//! PostgreSQL implementation of CommissionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::commission::{CommissionRecord, CommissionStatus, Payout, PayoutMethod, PayoutStatus};
use crate::domain::foundation::{
    CommissionId, CommissionRate, DomainError, ErrorCode, InstitutionId, Money, PaymentId,
    PayoutId, Timestamp,
};
use crate::ports::CommissionRepository;

use super::support::{corrupt, db_error, to_i32, to_u32};

const COMMISSION_COLUMNS: &str = r#"
    id, institution_id, payment_id, payment_amount, commission_amount, institution_share,
    rate_bps, status, payout_id, created_at, updated_at, paid_at
"#;

pub struct PostgresCommissionRepository {
    pool: PgPool,
}

impl PostgresCommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommissionRow {
    id: Uuid,
    institution_id: Uuid,
    payment_id: Uuid,
    payment_amount: i64,
    commission_amount: i64,
    institution_share: i64,
    rate_bps: i32,
    status: String,
    payout_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<CommissionRow> for CommissionRecord {
    type Error = DomainError;

    fn try_from(row: CommissionRow) -> Result<Self, Self::Error> {
        Ok(CommissionRecord {
            id: CommissionId::from_uuid(row.id),
            institution_id: InstitutionId::from_uuid(row.institution_id),
            payment_id: PaymentId::from_uuid(row.payment_id),
            payment_amount: Money::from_cents(row.payment_amount),
            commission_amount: Money::from_cents(row.commission_amount),
            institution_share: Money::from_cents(row.institution_share),
            rate: CommissionRate::from_bps(to_u32(row.rate_bps)).map_err(corrupt)?,
            status: CommissionStatus::parse(&row.status).map_err(corrupt)?,
            payout_id: row.payout_id.map(PayoutId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PayoutRow {
    id: Uuid,
    institution_id: Uuid,
    amount_cents: i64,
    method: String,
    reference: String,
    commission_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<PayoutRow> for Payout {
    type Error = DomainError;

    fn try_from(row: PayoutRow) -> Result<Self, Self::Error> {
        Ok(Payout {
            id: PayoutId::from_uuid(row.id),
            institution_id: InstitutionId::from_uuid(row.institution_id),
            amount: Money::from_cents(row.amount_cents),
            method: PayoutMethod::parse(&row.method).map_err(corrupt)?,
            reference: row.reference,
            status: PayoutStatus::Completed,
            commission_count: to_u32(row.commission_count),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CommissionRepository for PostgresCommissionRepository {
    async fn upsert(&self, record: &CommissionRecord) -> Result<CommissionRecord, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO commissions (
                id, institution_id, payment_id, payment_amount, commission_amount,
                institution_share, rate_bps, status, payout_id, created_at, updated_at, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (payment_id) DO UPDATE SET
                institution_id = EXCLUDED.institution_id,
                payment_amount = EXCLUDED.payment_amount,
                commission_amount = EXCLUDED.commission_amount,
                institution_share = EXCLUDED.institution_share,
                rate_bps = EXCLUDED.rate_bps,
                status = EXCLUDED.status,
                payout_id = EXCLUDED.payout_id,
                updated_at = EXCLUDED.updated_at,
                paid_at = EXCLUDED.paid_at
            RETURNING {}
            "#,
            COMMISSION_COLUMNS
        );
        let row: CommissionRow = sqlx::query_as(&sql)
            .bind(record.id.as_uuid())
            .bind(record.institution_id.as_uuid())
            .bind(record.payment_id.as_uuid())
            .bind(record.payment_amount.cents())
            .bind(record.commission_amount.cents())
            .bind(record.institution_share.cents())
            .bind(to_i32(record.rate.bps()))
            .bind(record.status.as_str())
            .bind(record.payout_id.map(|id| *id.as_uuid()))
            .bind(record.created_at.as_datetime())
            .bind(record.updated_at.as_datetime())
            .bind(record.paid_at.as_ref().map(|t| *t.as_datetime()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("upsert commission", e))?;

        CommissionRecord::try_from(row)
    }

    async fn find_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<CommissionRecord>, DomainError> {
        let sql = format!("SELECT {} FROM commissions WHERE payment_id = $1", COMMISSION_COLUMNS);
        let row: Option<CommissionRow> = sqlx::query_as(&sql)
            .bind(payment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find commission", e))?;

        row.map(CommissionRecord::try_from).transpose()
    }

    async fn list_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let sql = format!(
            "SELECT {} FROM commissions WHERE institution_id = $1 ORDER BY created_at ASC",
            COMMISSION_COLUMNS
        );
        let rows: Vec<CommissionRow> = sqlx::query_as(&sql)
            .bind(institution_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list commissions", e))?;

        rows.into_iter().map(CommissionRecord::try_from).collect()
    }

    async fn pending_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM commissions
            WHERE institution_id = $1 AND status = 'PENDING'
            ORDER BY created_at ASC
            "#,
            COMMISSION_COLUMNS
        );
        let rows: Vec<CommissionRow> = sqlx::query_as(&sql)
            .bind(institution_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list pending commissions", e))?;

        rows.into_iter().map(CommissionRecord::try_from).collect()
    }

    async fn list_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CommissionRecord>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM commissions
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at ASC
            "#,
            COMMISSION_COLUMNS
        );
        let rows: Vec<CommissionRow> = sqlx::query_as(&sql)
            .bind(from.as_datetime())
            .bind(to.as_datetime())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list commissions in window", e))?;

        rows.into_iter().map(CommissionRecord::try_from).collect()
    }

    async fn settle(
        &self,
        payout: &Payout,
        commission_ids: &[CommissionId],
    ) -> Result<(), DomainError> {
        let ids: Vec<Uuid> = commission_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO payouts (
                id, institution_id, amount_cents, method, reference, status,
                commission_count, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payout.id.as_uuid())
        .bind(payout.institution_id.as_uuid())
        .bind(payout.amount.cents())
        .bind(payout.method.as_str())
        .bind(&payout.reference)
        .bind(payout.status.as_str())
        .bind(to_i32(payout.commission_count))
        .bind(payout.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("save payout", e))?;

        let result = sqlx::query(
            r#"
            UPDATE commissions SET
                status = 'PAID',
                payout_id = $1,
                paid_at = $2,
                updated_at = $2
            WHERE id = ANY($3) AND status = 'PENDING'
            "#,
        )
        .bind(payout.id.as_uuid())
        .bind(payout.created_at.as_datetime())
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("settle commissions", e))?;

        // Dropping the transaction rolls back the payout insert.
        if result.rows_affected() != ids.len() as u64 {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Commissions changed while the payout was being prepared",
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit payout", e))
    }

    async fn payouts_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Payout>, DomainError> {
        let rows: Vec<PayoutRow> = sqlx::query_as(
            r#"
            SELECT id, institution_id, amount_cents, method, reference, commission_count, created_at
            FROM payouts
            WHERE institution_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(institution_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list payouts", e))?;

        rows.into_iter().map(Payout::try_from).collect()
    }
}
