//! Platform-course enrollment errors.

use thiserror::Error;

use crate::domain::catalog::{PlanType, StudentPlan};
use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, ErrorKind, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(EnrollmentId),

    #[error("User {user} already has an active enrollment in course {course}")]
    AlreadyEnrolled { user: UserId, course: CourseId },

    #[error("No active subscription for user {0}")]
    NoActiveSubscription(UserId),

    #[error("Course requires the {required} plan, subscription is on {actual}")]
    PlanMismatch {
        required: StudentPlan,
        actual: PlanType,
    },

    #[error("Enrollment quota reached: {current} current, {monthly} this month, quota {quota}")]
    QuotaExceeded {
        current: u32,
        monthly: u32,
        quota: u32,
    },

    #[error("Course {course} is full ({max} students)")]
    CourseFull { course: CourseId, max: u32 },

    #[error("User {user} has no active enrollment in course {course}")]
    NotEnrolled { user: UserId, course: CourseId },

    #[error("Enrollment {0} is not active")]
    NotActive(EnrollmentId),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl EnrollmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EnrollmentError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            EnrollmentError::UserNotFound(_) => ErrorCode::UserNotFound,
            EnrollmentError::EnrollmentNotFound(_) | EnrollmentError::NotEnrolled { .. } => {
                ErrorCode::EnrollmentNotFound
            }
            EnrollmentError::AlreadyEnrolled { .. } => ErrorCode::Conflict,
            EnrollmentError::NoActiveSubscription(_)
            | EnrollmentError::PlanMismatch { .. }
            | EnrollmentError::NotActive(_) => ErrorCode::InvalidState,
            EnrollmentError::QuotaExceeded { .. } | EnrollmentError::CourseFull { .. } => {
                ErrorCode::CapacityExceeded
            }
            EnrollmentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for EnrollmentError {
    fn from(err: DomainError) -> Self {
        EnrollmentError::Infrastructure(err.to_string())
    }
}

impl From<EnrollmentError> for DomainError {
    fn from(err: EnrollmentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
