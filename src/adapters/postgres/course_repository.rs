//! PostgreSQL implementations of CourseRepository and EnrollmentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::StudentPlan;
use crate::domain::enrollment::{AccessMethod, Course, Enrollment, EnrollmentStatus};
use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, InstitutionId, SubscriptionId, Timestamp,
    UserId,
};
use crate::ports::{CourseRepository, EnrollmentRepository};

use super::support::{corrupt, db_error, parse_plan, to_u32, violates};

pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    institution_id: Option<Uuid>,
    is_platform_course: bool,
    requires_subscription: bool,
    subscription_tier: Option<String>,
    max_students: Option<i32>,
    current_enrollments: i32,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: CourseId::from_uuid(row.id),
            title: row.title,
            institution_id: row.institution_id.map(InstitutionId::from_uuid),
            is_platform_course: row.is_platform_course,
            requires_subscription: row.requires_subscription,
            subscription_tier: row
                .subscription_tier
                .as_deref()
                .map(StudentPlan::parse)
                .transpose()
                .map_err(corrupt)?,
            max_students: row.max_students.map(to_u32),
            current_enrollments: to_u32(row.current_enrollments),
        })
    }
}

fn course_not_found(id: CourseId) -> DomainError {
    DomainError::new(ErrorCode::CourseNotFound, format!("Course not found: {}", id))
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, title, institution_id, is_platform_course, requires_subscription,
                   subscription_tier, max_students, current_enrollments
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find course", e))?;

        row.map(Course::try_from).transpose()
    }

    async fn try_take_seat(&self, id: CourseId) -> Result<bool, DomainError> {
        let taken: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE courses SET current_enrollments = current_enrollments + 1
            WHERE id = $1
              AND (max_students IS NULL OR current_enrollments < max_students)
            RETURNING current_enrollments
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("take course seat", e))?;

        if taken.is_some() {
            return Ok(true);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(course_not_found(id)),
        }
    }

    async fn release_seat(&self, id: CourseId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE courses SET current_enrollments = GREATEST(current_enrollments - 1, 0)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("release course seat", e))?;

        if result.rows_affected() == 0 {
            return Err(course_not_found(id));
        }
        Ok(())
    }
}

pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    status: String,
    access_method: String,
    subscription_id: Option<Uuid>,
    subscription_tier: Option<String>,
    enrolled_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DomainError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            course_id: CourseId::from_uuid(row.course_id),
            status: EnrollmentStatus::parse(&row.status).map_err(corrupt)?,
            access_method: AccessMethod::parse(&row.access_method).map_err(corrupt)?,
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            subscription_tier: row.subscription_tier.as_deref().map(parse_plan).transpose()?,
            enrolled_at: Timestamp::from_datetime(row.enrolled_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn create(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (
                id, user_id, course_id, status, access_method, subscription_id,
                subscription_tier, enrolled_at, ended_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.user_id.as_uuid())
        .bind(enrollment.course_id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(enrollment.access_method.as_str())
        .bind(enrollment.subscription_id.map(|id| *id.as_uuid()))
        .bind(enrollment.subscription_tier.map(|p| p.as_str()))
        .bind(enrollment.enrolled_at.as_datetime())
        .bind(enrollment.ended_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "enrollments_one_active_idx") {
                return DomainError::new(
                    ErrorCode::Conflict,
                    format!(
                        "User {} already has an active enrollment in course {}",
                        enrollment.user_id, enrollment.course_id
                    ),
                );
            }
            db_error("save enrollment", e)
        })?;

        Ok(())
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET
                status = $2,
                ended_at = $3
            WHERE id = $1
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(enrollment.ended_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update enrollment", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::EnrollmentNotFound,
                format!("Enrollment not found: {}", enrollment.id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, status, access_method, subscription_id,
                   subscription_tier, enrolled_at, ended_at
            FROM enrollments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find enrollment", e))?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn find_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, status, access_method, subscription_id,
                   subscription_tier, enrolled_at, ended_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2 AND status = 'ACTIVE'
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find active enrollment", e))?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn count_active_for_user(&self, user_id: UserId) -> Result<u32, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = $1 AND status = 'ACTIVE'",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count enrollments", e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn count_active_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u32, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE c.institution_id = $1 AND e.status = 'ACTIVE'
            "#,
        )
        .bind(institution_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count institution enrollments", e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
