//! CheckCourseAccessHandler - Resolves how a user reaches a course.

use std::sync::Arc;

use crate::domain::enrollment::{CourseAccess, EnrollmentError};
use crate::domain::foundation::{CourseId, UserId};
use crate::domain::subscription::Subject;
use crate::ports::{CourseRepository, Directory, EnrollmentRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CheckCourseAccessQuery {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Priority: active enrollment, then an ACTIVE subscription on an accepted
/// plan, then institution membership (reported only), then none.
pub struct CheckCourseAccessHandler {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    directory: Arc<dyn Directory>,
}

impl CheckCourseAccessHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            subscriptions,
            directory,
        }
    }

    pub async fn handle(&self, query: CheckCourseAccessQuery) -> Result<CourseAccess, EnrollmentError> {
        let course = self
            .courses
            .find_by_id(query.course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(query.course_id))?;

        if let Some(enrollment) = self
            .enrollments
            .find_active(query.user_id, course.id)
            .await?
        {
            return Ok(CourseAccess::enrolled(&enrollment));
        }

        if let Some(subscription) = self
            .subscriptions
            .find_current(Subject::Student(query.user_id))
            .await?
        {
            let accepted = subscription
                .plan
                .as_student()
                .map_or(false, |plan| course.accepts_plan(plan));
            if subscription.is_active() && accepted {
                return Ok(CourseAccess::subscribed(subscription.id, subscription.plan));
            }
        }

        if let Some(user) = self.directory.find_user(query.user_id).await? {
            if let Some(institution_id) = user.institution_id {
                if course.institution_id.map_or(true, |owner| owner == institution_id) {
                    return Ok(CourseAccess::institution_member(institution_id));
                }
            }
        }

        Ok(CourseAccess::none())
    }
}
