//! EnrollInCourseHandler - Enrolls a student through the subscription or
//! the basic path.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::quota::QuotaTracker;
use crate::domain::enrollment::{Course, Enrollment, EnrollmentError};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{Subject, Subscription, UsageCounters};
use crate::ports::{CourseRepository, Directory, EnrollmentRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct EnrollInCourseCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollInCourseResult {
    pub enrollment: Enrollment,
    /// Counters after the enrollment, for subscription-path enrollments.
    pub usage: Option<UsageCounters>,
}

pub struct EnrollInCourseHandler {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    directory: Arc<dyn Directory>,
    quota: Arc<QuotaTracker>,
}

impl EnrollInCourseHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        directory: Arc<dyn Directory>,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            subscriptions,
            directory,
            quota,
        }
    }

    pub async fn handle(&self, cmd: EnrollInCourseCommand) -> Result<EnrollInCourseResult, EnrollmentError> {
        if self.directory.find_user(cmd.user_id).await?.is_none() {
            return Err(EnrollmentError::UserNotFound(cmd.user_id));
        }
        let course = self
            .courses
            .find_by_id(cmd.course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(cmd.course_id))?;

        if self
            .enrollments
            .find_active(cmd.user_id, course.id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled {
                user: cmd.user_id,
                course: course.id,
            });
        }

        let result = if course.requires_subscription {
            self.enroll_with_subscription(cmd.user_id, &course).await?
        } else {
            self.enroll_basic(cmd.user_id, &course).await?
        };

        tracing::info!(
            enrollment_id = %result.enrollment.id,
            user_id = %cmd.user_id,
            course_id = %course.id,
            access_method = result.enrollment.access_method.as_str(),
            "Course enrollment created"
        );
        Ok(result)
    }

    async fn enroll_with_subscription(
        &self,
        user_id: UserId,
        course: &Course,
    ) -> Result<EnrollInCourseResult, EnrollmentError> {
        let subscription = self
            .subscriptions
            .find_current(Subject::Student(user_id))
            .await?
            .filter(|s| s.is_active())
            .ok_or(EnrollmentError::NoActiveSubscription(user_id))?;

        if let Some(required) = course.subscription_tier {
            if subscription.plan.as_student() != Some(required) {
                return Err(EnrollmentError::PlanMismatch {
                    required,
                    actual: subscription.plan,
                });
            }
        }

        if !subscription.can_admit_enrollment() {
            return Err(quota_exceeded(&subscription));
        }

        let usage = match self.quota.track_enrollment_usage(subscription.id).await {
            Ok(usage) => usage,
            Err(e) if e.code == ErrorCode::CapacityExceeded => {
                let latest = self
                    .subscriptions
                    .find_by_id(subscription.id)
                    .await?
                    .unwrap_or(subscription);
                return Err(quota_exceeded(&latest));
            }
            Err(e) => return Err(e.into()),
        };

        let enrollment = Enrollment::via_subscription(
            user_id,
            course.id,
            subscription.id,
            subscription.plan,
            Timestamp::now(),
        );
        if let Err(e) = self.enrollments.create(&enrollment).await {
            self.quota.release_enrollment(subscription.id).await?;
            return Err(self.create_error(e, user_id, course.id));
        }

        Ok(EnrollInCourseResult {
            enrollment,
            usage: Some(usage),
        })
    }

    async fn enroll_basic(
        &self,
        user_id: UserId,
        course: &Course,
    ) -> Result<EnrollInCourseResult, EnrollmentError> {
        if !self.courses.try_take_seat(course.id).await? {
            return Err(EnrollmentError::CourseFull {
                course: course.id,
                max: course.max_students.unwrap_or(course.current_enrollments),
            });
        }

        let enrollment = Enrollment::direct(user_id, course.id, Timestamp::now());
        if let Err(e) = self.enrollments.create(&enrollment).await {
            self.courses.release_seat(course.id).await?;
            return Err(self.create_error(e, user_id, course.id));
        }

        Ok(EnrollInCourseResult {
            enrollment,
            usage: None,
        })
    }

    fn create_error(
        &self,
        err: DomainError,
        user: UserId,
        course: CourseId,
    ) -> EnrollmentError {
        match err.code {
            ErrorCode::Conflict => EnrollmentError::AlreadyEnrolled { user, course },
            _ => err.into(),
        }
    }
}

fn quota_exceeded(subscription: &Subscription) -> EnrollmentError {
    EnrollmentError::QuotaExceeded {
        current: subscription.usage.current_enrollments,
        monthly: subscription.usage.monthly_enrollments,
        quota: subscription.limits.enrollment_quota,
    }
}
