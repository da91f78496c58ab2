//! PostgreSQL implementation of LiveClassRepository.
//!
//! The `live_classes_no_overlap` exclusion constraint rejects a second open
//! session of one instructor in an overlapping window. Participants are
//! only changed with `array_append`/`array_remove` so concurrent joins
//! never overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, InstitutionId, LiveClassId, Timestamp, UserId,
};
use crate::domain::live_class::{LiveClass, LiveClassStatus, TimeWindow};
use crate::ports::LiveClassRepository;

use super::support::{corrupt, db_error, to_i32, to_u32, violates};

const LIVE_CLASS_COLUMNS: &str = r#"
    id, title, instructor_id, institution_id, course_id, start_time, end_time, status,
    max_participants, participants, cancellation_reason, cancelled_at, created_at, updated_at
"#;

pub struct PostgresLiveClassRepository {
    pool: PgPool,
}

impl PostgresLiveClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: LiveClassId) -> Result<bool, DomainError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM live_classes WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find live class", e))?;
        Ok(found.is_some())
    }
}

fn not_found(id: LiveClassId) -> DomainError {
    DomainError::new(ErrorCode::LiveClassNotFound, format!("Live class not found: {}", id))
}

#[derive(Debug, sqlx::FromRow)]
struct LiveClassRow {
    id: Uuid,
    title: String,
    instructor_id: Uuid,
    institution_id: Option<Uuid>,
    course_id: Option<Uuid>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    max_participants: i32,
    participants: Vec<Uuid>,
    cancellation_reason: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LiveClassRow> for LiveClass {
    type Error = DomainError;

    fn try_from(row: LiveClassRow) -> Result<Self, Self::Error> {
        Ok(LiveClass {
            id: LiveClassId::from_uuid(row.id),
            title: row.title,
            instructor_id: UserId::from_uuid(row.instructor_id),
            institution_id: row.institution_id.map(InstitutionId::from_uuid),
            course_id: row.course_id.map(CourseId::from_uuid),
            window: TimeWindow::new(
                Timestamp::from_datetime(row.start_time),
                Timestamp::from_datetime(row.end_time),
            ),
            status: LiveClassStatus::parse(&row.status).map_err(corrupt)?,
            max_participants: to_u32(row.max_participants),
            participants: row.participants.into_iter().map(UserId::from_uuid).collect(),
            cancellation_reason: row.cancellation_reason,
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn participant_ids(live_class: &LiveClass) -> Vec<Uuid> {
    live_class.participants.iter().map(|id| *id.as_uuid()).collect()
}

impl PostgresLiveClassRepository {
    async fn fetch(&self, filter: &str, bind: Uuid, extra: Option<DateTime<Utc>>) -> Result<Vec<LiveClass>, DomainError> {
        let sql = format!(
            "SELECT {} FROM live_classes WHERE {} ORDER BY start_time ASC",
            LIVE_CLASS_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, LiveClassRow>(&sql).bind(bind);
        if let Some(extra) = extra {
            query = query.bind(extra);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list live classes", e))?;
        rows.into_iter().map(LiveClass::try_from).collect()
    }
}

#[async_trait]
impl LiveClassRepository for PostgresLiveClassRepository {
    async fn save(&self, live_class: &LiveClass) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO live_classes (
                id, title, instructor_id, institution_id, course_id, start_time, end_time,
                status, max_participants, participants, cancellation_reason, cancelled_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(live_class.id.as_uuid())
        .bind(&live_class.title)
        .bind(live_class.instructor_id.as_uuid())
        .bind(live_class.institution_id.map(|id| *id.as_uuid()))
        .bind(live_class.course_id.map(|id| *id.as_uuid()))
        .bind(live_class.window.start.as_datetime())
        .bind(live_class.window.end.as_datetime())
        .bind(live_class.status.as_str())
        .bind(to_i32(live_class.max_participants))
        .bind(participant_ids(live_class))
        .bind(&live_class.cancellation_reason)
        .bind(live_class.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .bind(live_class.created_at.as_datetime())
        .bind(live_class.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "live_classes_no_overlap") {
                return DomainError::new(
                    ErrorCode::Conflict,
                    "Instructor already has a live class in this time slot",
                );
            }
            db_error("save live class", e)
        })?;

        Ok(())
    }

    async fn update(&self, live_class: &LiveClass) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE live_classes SET
                status = $2,
                cancellation_reason = $3,
                cancelled_at = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(live_class.id.as_uuid())
        .bind(live_class.status.as_str())
        .bind(&live_class.cancellation_reason)
        .bind(live_class.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .bind(live_class.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update live class", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(live_class.id));
        }
        Ok(())
    }

    async fn add_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<Option<LiveClass>, DomainError> {
        let sql = format!(
            r#"
            UPDATE live_classes SET
                participants = array_append(participants, $2),
                updated_at = $3
            WHERE id = $1
              AND status = 'ACTIVE'
              AND cardinality(participants) < max_participants
              AND NOT ($2 = ANY(participants))
            RETURNING {}
            "#,
            LIVE_CLASS_COLUMNS
        );
        let row: Option<LiveClassRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(user.as_uuid())
            .bind(now.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("add live class participant", e))?;

        match row {
            Some(row) => LiveClass::try_from(row).map(Some),
            None if self.exists(id).await? => Ok(None),
            None => Err(not_found(id)),
        }
    }

    async fn remove_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE live_classes SET
                participants = array_remove(participants, $2),
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(user.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("remove live class participant", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: LiveClassId) -> Result<Option<LiveClass>, DomainError> {
        let sql = format!("SELECT {} FROM live_classes WHERE id = $1", LIVE_CLASS_COLUMNS);
        let row: Option<LiveClassRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find live class", e))?;

        row.map(LiveClass::try_from).transpose()
    }

    async fn find_open_for_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<LiveClass>, DomainError> {
        self.fetch(
            "instructor_id = $1 AND status IN ('SCHEDULED', 'ACTIVE')",
            *instructor_id.as_uuid(),
            None,
        )
        .await
    }

    async fn find_open_for_course(&self, course_id: CourseId) -> Result<Vec<LiveClass>, DomainError> {
        self.fetch(
            "course_id = $1 AND status IN ('SCHEDULED', 'ACTIVE')",
            *course_id.as_uuid(),
            None,
        )
        .await
    }

    async fn find_scheduled_from(
        &self,
        instructor_id: UserId,
        from: Timestamp,
    ) -> Result<Vec<LiveClass>, DomainError> {
        self.fetch(
            "instructor_id = $1 AND status = 'SCHEDULED' AND start_time >= $2",
            *instructor_id.as_uuid(),
            Some(*from.as_datetime()),
        )
        .await
    }
}
