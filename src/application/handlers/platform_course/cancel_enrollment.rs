//! CancelEnrollmentHandler - Ends an active enrollment and gives back what
//! it held.

use std::sync::Arc;

use crate::application::handlers::quota::QuotaTracker;
use crate::domain::enrollment::{Enrollment, EnrollmentError};
use crate::domain::foundation::{CourseId, Timestamp, UserId};
use crate::ports::{CourseRepository, EnrollmentRepository};

#[derive(Debug, Clone)]
pub struct CancelEnrollmentCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Subscription enrollments release one `current_enrollments`; monthly
/// counters stay. Basic enrollments release their course seat.
pub struct CancelEnrollmentHandler {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    quota: Arc<QuotaTracker>,
}

impl CancelEnrollmentHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            quota,
        }
    }

    pub async fn handle(&self, cmd: CancelEnrollmentCommand) -> Result<Enrollment, EnrollmentError> {
        let mut enrollment = self
            .enrollments
            .find_active(cmd.user_id, cmd.course_id)
            .await?
            .ok_or(EnrollmentError::NotEnrolled {
                user: cmd.user_id,
                course: cmd.course_id,
            })?;

        enrollment.cancel(Timestamp::now());
        self.enrollments.update(&enrollment).await?;

        match enrollment.subscription_id {
            Some(subscription_id) if enrollment.consumed_quota() => {
                self.quota.release_enrollment(subscription_id).await?;
            }
            _ => self.courses.release_seat(enrollment.course_id).await?,
        }

        tracing::info!(
            enrollment_id = %enrollment.id,
            user_id = %cmd.user_id,
            course_id = %cmd.course_id,
            "Course enrollment cancelled"
        );
        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::platform_course::{EnrollInCourseCommand, EnrollInCourseHandler};
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::catalog::StudentPlan;
    use crate::domain::enrollment::EnrollmentStatus;
    use crate::ports::SubscriptionRepository;

    #[tokio::test]
    async fn cancel_releases_current_but_not_monthly() {
        let platform = TestPlatform::new();
        let mut course = platform.course(None).await;
        course.requires_subscription = true;
        platform.courses.insert(course.clone()).await;
        let (student, sub) = platform.student_with_plan(StudentPlan::Basic).await;
        let quota = Arc::new(platform.quota_tracker());

        EnrollInCourseHandler::new(
            platform.course_port(),
            platform.enrollment_port(),
            platform.subscription_port(),
            platform.directory_port(),
            quota.clone(),
        )
        .handle(EnrollInCourseCommand {
            user_id: student.id,
            course_id: course.id,
        })
        .await
        .unwrap();

        let cancelled = CancelEnrollmentHandler::new(platform.course_port(), platform.enrollment_port(), quota)
            .handle(CancelEnrollmentCommand {
                user_id: student.id,
                course_id: course.id,
            })
            .await
            .unwrap();

        assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);
        assert!(cancelled.ended_at.is_some());
        let stored = platform.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.usage.current_enrollments, 0);
        assert_eq!(stored.usage.monthly_enrollments, 1);
    }

    #[tokio::test]
    async fn nothing_to_cancel_is_not_found() {
        let platform = TestPlatform::new();
        let err = CancelEnrollmentHandler::new(
            platform.course_port(),
            platform.enrollment_port(),
            Arc::new(platform.quota_tracker()),
        )
        .handle(CancelEnrollmentCommand {
            user_id: UserId::new(),
            course_id: CourseId::new(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, EnrollmentError::NotEnrolled { .. }));
    }
}
