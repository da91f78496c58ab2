//! PostgreSQL implementation of SubscriptionRepository and SubscriptionLogWriter.
//!
//! Quota admission is one conditional `UPDATE ... RETURNING`: the row is
//! only touched when the subscription is ACTIVE and under quota, so two
//! concurrent admissions can never both take the last slot. Row updates
//! never write the usage columns, so a stale snapshot cannot undo an
//! admission that landed after it was read.
//!
//! A lifecycle change runs in one transaction covering the rows, the
//! institution's commission rate, the log and billing history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{BillingCycle, QuotaLimits};
use crate::domain::foundation::{
    CommissionRate, DomainError, ErrorCode, InstitutionId, LogEntryId, Money, SubscriptionId,
    TierId, Timestamp, UserId,
};
use crate::domain::subscription::{
    BillingRecord, LifecycleChange, LogAction, Subject, SubjectKind, Subscription, SubscriptionLog,
    SubscriptionOrigin, SubscriptionStatus, UsageCounters,
};
use crate::ports::{SubscriptionLogWriter, SubscriptionRepository};

use super::support::{corrupt, db_error, parse_plan, to_i32, to_u32, violates};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, subject_kind, subject_id, tier_id, plan, status, billing_cycle, amount_cents,
    start_date, end_date, enrollment_quota, attendance_quota, max_live_classes,
    grace_period_days, current_enrollments, monthly_enrollments, monthly_attendance,
    auto_renew, origin, original_subscription_id, created_at, updated_at, cancelled_at
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: SubscriptionId) -> Result<bool, DomainError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM subscriptions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find subscription", e))?;
        Ok(found.is_some())
    }

    async fn select_many(&self, filter: &str, now: Option<DateTime<Utc>>) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE {}", SUBSCRIPTION_COLUMNS, filter);
        let mut query = sqlx::query_as::<_, SubscriptionRow>(&sql);
        if let Some(now) = now {
            query = query.bind(now);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list subscriptions", e))?;
        rows.into_iter().map(Subscription::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    subject_kind: String,
    subject_id: Uuid,
    tier_id: Uuid,
    plan: String,
    status: String,
    billing_cycle: String,
    amount_cents: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    enrollment_quota: i32,
    attendance_quota: i32,
    max_live_classes: i32,
    grace_period_days: i32,
    current_enrollments: i32,
    monthly_enrollments: i32,
    monthly_attendance: i32,
    auto_renew: bool,
    origin: String,
    original_subscription_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let kind = SubjectKind::parse(&row.subject_kind).map_err(corrupt)?;
        let origin = match (row.origin.as_str(), row.original_subscription_id) {
            ("REGULAR", _) => SubscriptionOrigin::Regular,
            ("TRIAL", _) => SubscriptionOrigin::Trial,
            ("FALLBACK", Some(original)) => SubscriptionOrigin::Fallback {
                original_id: SubscriptionId::from_uuid(original),
            },
            (other, _) => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid subscription origin: {}", other),
                ))
            }
        };

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            subject: Subject::from_parts(kind, row.subject_id),
            tier_id: TierId::from_uuid(row.tier_id),
            plan: parse_plan(&row.plan)?,
            status: SubscriptionStatus::parse(&row.status).map_err(corrupt)?,
            billing_cycle: BillingCycle::parse(&row.billing_cycle).map_err(corrupt)?,
            amount: Money::from_cents(row.amount_cents),
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            limits: QuotaLimits {
                enrollment_quota: to_u32(row.enrollment_quota),
                attendance_quota: to_u32(row.attendance_quota),
                max_live_classes: to_u32(row.max_live_classes),
                grace_period_days: to_u32(row.grace_period_days),
            },
            usage: UsageCounters {
                current_enrollments: to_u32(row.current_enrollments),
                monthly_enrollments: to_u32(row.monthly_enrollments),
                monthly_attendance: to_u32(row.monthly_attendance),
            },
            auto_renew: row.auto_renew,
            origin,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CountersRow {
    current_enrollments: i32,
    monthly_enrollments: i32,
    monthly_attendance: i32,
}

impl From<CountersRow> for UsageCounters {
    fn from(row: CountersRow) -> Self {
        UsageCounters {
            current_enrollments: to_u32(row.current_enrollments),
            monthly_enrollments: to_u32(row.monthly_enrollments),
            monthly_attendance: to_u32(row.monthly_attendance),
        }
    }
}

fn origin_parts(origin: &SubscriptionOrigin) -> (&'static str, Option<Uuid>) {
    match origin {
        SubscriptionOrigin::Regular => ("REGULAR", None),
        SubscriptionOrigin::Trial => ("TRIAL", None),
        SubscriptionOrigin::Fallback { original_id } => ("FALLBACK", Some(*original_id.as_uuid())),
    }
}

async fn insert_subscription<'e, E>(executor: E, s: &Subscription) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let (origin, original_id) = origin_parts(&s.origin);
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, subject_kind, subject_id, tier_id, plan, status, billing_cycle, amount_cents,
            start_date, end_date, enrollment_quota, attendance_quota, max_live_classes,
            grace_period_days, current_enrollments, monthly_enrollments, monthly_attendance,
            auto_renew, origin, original_subscription_id, created_at, updated_at, cancelled_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                  $18, $19, $20, $21, $22, $23)
        "#,
    )
    .bind(s.id.as_uuid())
    .bind(s.subject.kind().as_str())
    .bind(s.subject.uuid())
    .bind(s.tier_id.as_uuid())
    .bind(s.plan.as_str())
    .bind(s.status.as_str())
    .bind(s.billing_cycle.as_str())
    .bind(s.amount.cents())
    .bind(s.start_date.as_datetime())
    .bind(s.end_date.as_datetime())
    .bind(to_i32(s.limits.enrollment_quota))
    .bind(to_i32(s.limits.attendance_quota))
    .bind(to_i32(s.limits.max_live_classes))
    .bind(to_i32(s.limits.grace_period_days))
    .bind(to_i32(s.usage.current_enrollments))
    .bind(to_i32(s.usage.monthly_enrollments))
    .bind(to_i32(s.usage.monthly_attendance))
    .bind(s.auto_renew)
    .bind(origin)
    .bind(original_id)
    .bind(s.created_at.as_datetime())
    .bind(s.updated_at.as_datetime())
    .bind(s.cancelled_at.as_ref().map(|t| *t.as_datetime()))
    .execute(executor)
    .await?;
    Ok(())
}

async fn update_subscription<'e, E>(executor: E, s: &Subscription) -> Result<u64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE subscriptions SET
            tier_id = $2,
            plan = $3,
            status = $4,
            billing_cycle = $5,
            amount_cents = $6,
            start_date = $7,
            end_date = $8,
            enrollment_quota = $9,
            attendance_quota = $10,
            max_live_classes = $11,
            grace_period_days = $12,
            auto_renew = $13,
            updated_at = $14,
            cancelled_at = $15
        WHERE id = $1
        "#,
    )
    .bind(s.id.as_uuid())
    .bind(s.tier_id.as_uuid())
    .bind(s.plan.as_str())
    .bind(s.status.as_str())
    .bind(s.billing_cycle.as_str())
    .bind(s.amount.cents())
    .bind(s.start_date.as_datetime())
    .bind(s.end_date.as_datetime())
    .bind(to_i32(s.limits.enrollment_quota))
    .bind(to_i32(s.limits.attendance_quota))
    .bind(to_i32(s.limits.max_live_classes))
    .bind(to_i32(s.limits.grace_period_days))
    .bind(s.auto_renew)
    .bind(s.updated_at.as_datetime())
    .bind(s.cancelled_at.as_ref().map(|t| *t.as_datetime()))
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

async fn update_commission_rate<'e, E>(
    executor: E,
    institution: InstitutionId,
    rate: CommissionRate,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE institutions SET commission_rate_bps = $2 WHERE id = $1")
        .bind(institution.as_uuid())
        .bind(to_i32(rate.bps()))
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

async fn insert_log<'e, E>(executor: E, entry: &SubscriptionLog) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO subscription_logs (
            id, subscription_id, subject_kind, subject_id, action, old_plan, new_plan,
            old_amount, new_amount, proration, effective_at, reason, actor_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.subscription_id.as_uuid())
    .bind(entry.subject.kind().as_str())
    .bind(entry.subject.uuid())
    .bind(entry.action.as_str())
    .bind(entry.old_plan.map(|p| p.as_str()))
    .bind(entry.new_plan.map(|p| p.as_str()))
    .bind(entry.old_amount.map(|m| m.cents()))
    .bind(entry.new_amount.map(|m| m.cents()))
    .bind(entry.proration.map(|m| m.cents()))
    .bind(entry.effective_at.as_ref().map(|t| *t.as_datetime()))
    .bind(&entry.reason)
    .bind(entry.actor_id.map(|id| *id.as_uuid()))
    .bind(entry.created_at.as_datetime())
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_billing<'e, E>(executor: E, record: &BillingRecord) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO billing_history (
            id, subscription_id, subject_kind, subject_id, amount_cents, description, billed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.subscription_id.as_uuid())
    .bind(record.subject.kind().as_str())
    .bind(record.subject.uuid())
    .bind(record.amount.cents())
    .bind(&record.description)
    .bind(record.billed_at.as_datetime())
    .execute(executor)
    .await?;
    Ok(())
}

fn not_found(id: SubscriptionId) -> DomainError {
    DomainError::new(
        ErrorCode::SubscriptionNotFound,
        format!("Subscription not found: {}", id),
    )
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        insert_subscription(&self.pool, subscription)
            .await
            .map_err(|e| {
                if violates(&e, "subscriptions_pkey") {
                    return DomainError::new(
                        ErrorCode::Conflict,
                        format!("Subscription {} already exists", subscription.id),
                    );
                }
                db_error("save subscription", e)
            })
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let affected = update_subscription(&self.pool, subscription)
            .await
            .map_err(|e| db_error("update subscription", e))?;
        if affected == 0 {
            return Err(not_found(subscription.id));
        }
        Ok(())
    }

    async fn commit(&self, change: &LifecycleChange) -> Result<(), DomainError> {
        // Returning early drops `tx`, which rolls everything back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        for subscription in &change.updated {
            let affected = update_subscription(&mut *tx, subscription)
                .await
                .map_err(|e| db_error("update subscription", e))?;
            if affected == 0 {
                return Err(not_found(subscription.id));
            }
        }
        for subscription in &change.inserted {
            insert_subscription(&mut *tx, subscription)
                .await
                .map_err(|e| {
                    if violates(&e, "subscriptions_pkey") {
                        return DomainError::new(
                            ErrorCode::Conflict,
                            format!("Subscription {} already exists", subscription.id),
                        );
                    }
                    db_error("save subscription", e)
                })?;
        }
        if let Some((institution, rate)) = change.commission_rate {
            let affected = update_commission_rate(&mut *tx, institution, rate)
                .await
                .map_err(|e| db_error("set commission rate", e))?;
            if affected == 0 {
                return Err(DomainError::new(
                    ErrorCode::InstitutionNotFound,
                    format!("Institution not found: {}", institution),
                ));
            }
        }
        for entry in &change.log {
            insert_log(&mut *tx, entry)
                .await
                .map_err(|e| db_error("append subscription log", e))?;
        }
        for record in &change.billing {
            insert_billing(&mut *tx, record)
                .await
                .map_err(|e| db_error("append billing record", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit lifecycle change", e))
    }

    async fn find_by_id(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current(&self, subject: Subject) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE subject_kind = $1 AND subject_id = $2 AND status <> 'EXPIRED'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(subject.kind().as_str())
            .bind(subject.uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find current subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_lapsed_trials(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        self.select_many(
            "status = 'TRIAL' AND end_date <= $1 ORDER BY end_date ASC",
            Some(*now.as_datetime()),
        )
        .await
    }

    async fn find_active(&self) -> Result<Vec<Subscription>, DomainError> {
        self.select_many("status = 'ACTIVE' ORDER BY created_at ASC", None)
            .await
    }

    async fn try_consume_enrollment(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError> {
        let row: Option<CountersRow> = sqlx::query_as(
            r#"
            UPDATE subscriptions SET
                current_enrollments = current_enrollments + 1,
                monthly_enrollments = monthly_enrollments + 1,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'ACTIVE'
              AND current_enrollments < enrollment_quota
              AND monthly_enrollments < enrollment_quota
            RETURNING current_enrollments, monthly_enrollments, monthly_attendance
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("admit enrollment", e))?;

        match row {
            Some(row) => Ok(Some(row.into())),
            None if self.exists(id).await? => Ok(None),
            None => Err(not_found(id)),
        }
    }

    async fn try_consume_attendance(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError> {
        let row: Option<CountersRow> = sqlx::query_as(
            r#"
            UPDATE subscriptions SET
                monthly_attendance = monthly_attendance + 1,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'ACTIVE'
              AND monthly_attendance < attendance_quota
            RETURNING current_enrollments, monthly_enrollments, monthly_attendance
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("admit attendance", e))?;

        match row {
            Some(row) => Ok(Some(row.into())),
            None if self.exists(id).await? => Ok(None),
            None => Err(not_found(id)),
        }
    }

    async fn release_enrollment(&self, id: SubscriptionId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                current_enrollments = GREATEST(current_enrollments - 1, 0),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("release enrollment", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn reset_monthly_usage(&self) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                monthly_enrollments = 0,
                monthly_attendance = 0,
                updated_at = NOW()
            WHERE status = 'ACTIVE'
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("reset monthly usage", e))?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL audit trail: `subscription_logs` and `billing_history`.
pub struct PostgresSubscriptionLog {
    pool: PgPool,
}

impl PostgresSubscriptionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: Uuid,
    subscription_id: Uuid,
    subject_kind: String,
    subject_id: Uuid,
    action: String,
    old_plan: Option<String>,
    new_plan: Option<String>,
    old_amount: Option<i64>,
    new_amount: Option<i64>,
    proration: Option<i64>,
    effective_at: Option<DateTime<Utc>>,
    reason: Option<String>,
    actor_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LogRow> for SubscriptionLog {
    type Error = DomainError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let kind = SubjectKind::parse(&row.subject_kind).map_err(corrupt)?;
        let action = LogAction::parse(&row.action).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid log action: {}", row.action),
            )
        })?;
        Ok(SubscriptionLog {
            id: LogEntryId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            subject: Subject::from_parts(kind, row.subject_id),
            action,
            old_plan: row.old_plan.as_deref().map(parse_plan).transpose()?,
            new_plan: row.new_plan.as_deref().map(parse_plan).transpose()?,
            old_amount: row.old_amount.map(Money::from_cents),
            new_amount: row.new_amount.map(Money::from_cents),
            proration: row.proration.map(Money::from_cents),
            effective_at: row.effective_at.map(Timestamp::from_datetime),
            reason: row.reason,
            actor_id: row.actor_id.map(UserId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BillingRow {
    id: Uuid,
    subscription_id: Uuid,
    subject_kind: String,
    subject_id: Uuid,
    amount_cents: i64,
    description: String,
    billed_at: DateTime<Utc>,
}

impl TryFrom<BillingRow> for BillingRecord {
    type Error = DomainError;

    fn try_from(row: BillingRow) -> Result<Self, Self::Error> {
        let kind = SubjectKind::parse(&row.subject_kind).map_err(corrupt)?;
        Ok(BillingRecord {
            id: LogEntryId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            subject: Subject::from_parts(kind, row.subject_id),
            amount: Money::from_cents(row.amount_cents),
            description: row.description,
            billed_at: Timestamp::from_datetime(row.billed_at),
        })
    }
}

#[async_trait]
impl SubscriptionLogWriter for PostgresSubscriptionLog {
    async fn append(&self, entry: &SubscriptionLog) -> Result<(), DomainError> {
        insert_log(&self.pool, entry)
            .await
            .map_err(|e| db_error("append subscription log", e))
    }

    async fn append_billing(&self, record: &BillingRecord) -> Result<(), DomainError> {
        insert_billing(&self.pool, record)
            .await
            .map_err(|e| db_error("append billing record", e))
    }

    async fn entries_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<SubscriptionLog>, DomainError> {
        let rows: Vec<LogRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, subject_kind, subject_id, action, old_plan, new_plan,
                   old_amount, new_amount, proration, effective_at, reason, actor_id, created_at
            FROM subscription_logs
            WHERE subscription_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list subscription log", e))?;

        rows.into_iter().map(SubscriptionLog::try_from).collect()
    }

    async fn billing_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<BillingRecord>, DomainError> {
        let rows: Vec<BillingRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, subject_kind, subject_id, amount_cents, description, billed_at
            FROM billing_history
            WHERE subscription_id = $1
            ORDER BY billed_at ASC
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list billing history", e))?;

        rows.into_iter().map(BillingRecord::try_from).collect()
    }
}
