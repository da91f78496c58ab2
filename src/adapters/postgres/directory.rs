//! PostgreSQL implementations of Directory and PaymentReader.
//!
//! Users, institutions and payments are written by other services; this
//! adapter only reads them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::directory::{Institution, Payment, PaymentStatus, User, UserRole};
use crate::domain::foundation::{
    CommissionRate, DomainError, EnrollmentId, InstitutionId, Money, PaymentId,
    Timestamp, UserId,
};
use crate::ports::{Directory, PaymentReader};

use super::support::{corrupt, db_error, to_u32};

pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    institution_id: Option<Uuid>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            role: UserRole::parse(&row.role).map_err(corrupt)?,
            institution_id: row.institution_id.map(InstitutionId::from_uuid),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InstitutionRow {
    id: Uuid,
    name: String,
    commission_rate_bps: Option<i32>,
    is_active: bool,
}

impl TryFrom<InstitutionRow> for Institution {
    type Error = DomainError;

    fn try_from(row: InstitutionRow) -> Result<Self, Self::Error> {
        Ok(Institution {
            id: InstitutionId::from_uuid(row.id),
            name: row.name,
            commission_rate: row
                .commission_rate_bps
                .map(|bps| CommissionRate::from_bps(to_u32(bps)))
                .transpose()
                .map_err(corrupt)?,
            is_active: row.is_active,
        })
    }
}

#[async_trait]
impl Directory for PostgresDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, role, institution_id FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_institution(&self, id: InstitutionId) -> Result<Option<Institution>, DomainError> {
        let row: Option<InstitutionRow> = sqlx::query_as(
            "SELECT id, name, commission_rate_bps, is_active FROM institutions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find institution", e))?;

        row.map(Institution::try_from).transpose()
    }
}

pub struct PostgresPayments {
    pool: PgPool,
}

impl PostgresPayments {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    enrollment_id: Option<Uuid>,
    amount_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            enrollment_id: row.enrollment_id.map(EnrollmentId::from_uuid),
            amount: Money::from_cents(row.amount_cents),
            status: PaymentStatus::parse(&row.status).map_err(corrupt)?,
            created_at: Timestamp::from_datetime(row.created_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl PaymentReader for PostgresPayments {
    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, enrollment_id, amount_cents, status, created_at, completed_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_uncommissioned(&self) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.user_id, p.enrollment_id, p.amount_cents, p.status,
                   p.created_at, p.completed_at
            FROM payments p
            LEFT JOIN commissions c ON c.payment_id = p.id
            WHERE p.status = 'COMPLETED' AND c.id IS NULL
            ORDER BY p.created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list uncommissioned payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
