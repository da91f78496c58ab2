//! Live-class governance errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | *NotFound | 404 |
//! | NotActive / InvalidTransition / JoinNotAllowed | 409 |
//! | InstructorConflict / AlreadyJoined | 409 |
//! | LiveClassLimitReached / ClassFull | 422 |
//! | role, linkage, time and participant checks | 400 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::directory::UserRole;
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, ErrorKind, InstitutionId, LiveClassId, UserId,
};

use super::LiveClassStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveClassError {
    #[error("Instructor not found: {0}")]
    InstructorNotFound(UserId),

    #[error("User {user} has role {role:?} and cannot host live classes")]
    NotAnInstructor { user: UserId, role: UserRole },

    #[error("Instructor already has live class {existing} in this time slot")]
    InstructorConflict { existing: LiveClassId },

    #[error("Institution not found: {0}")]
    InstitutionNotFound(InstitutionId),

    #[error("Instructor {instructor} does not belong to institution {institution}")]
    NotInstitutionMember {
        instructor: UserId,
        institution: InstitutionId,
    },

    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Course {0} does not belong to the selected institution")]
    CourseInstitutionMismatch(CourseId),

    #[error("Live class limit of {limit} reached ({upcoming} upcoming)")]
    LiveClassLimitReached { limit: u32, upcoming: u32 },

    #[error("Live classes must be scheduled at least {min_minutes} minutes in advance")]
    InsufficientNotice { min_minutes: i64 },

    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("Live classes cannot exceed {max_minutes} minutes, got {actual_minutes}")]
    TooLong { max_minutes: i64, actual_minutes: i64 },

    #[error("Max participants must be between {min} and {max}, got {actual}")]
    ParticipantsOutOfRange { min: u32, max: u32, actual: u32 },

    #[error("Live class not found: {0}")]
    NotFound(LiveClassId),

    #[error("Live class {id} is {status}, not ACTIVE")]
    NotActive { id: LiveClassId, status: LiveClassStatus },

    #[error("Cannot move live class from {from} to {to}")]
    InvalidTransition {
        from: LiveClassStatus,
        to: LiveClassStatus,
    },

    #[error("Live class is full ({max} participants)")]
    ClassFull { max: u32 },

    #[error("User {0} has already joined this live class")]
    AlreadyJoined(UserId),

    #[error("User {user} cannot join: {reason}")]
    JoinNotAllowed { user: UserId, reason: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl LiveClassError {
    pub fn code(&self) -> ErrorCode {
        use LiveClassError::*;
        match self {
            InstructorNotFound(_) => ErrorCode::UserNotFound,
            InstitutionNotFound(_) => ErrorCode::InstitutionNotFound,
            CourseNotFound(_) => ErrorCode::CourseNotFound,
            NotFound(_) => ErrorCode::LiveClassNotFound,
            InstructorConflict { .. } | AlreadyJoined(_) => ErrorCode::Conflict,
            LiveClassLimitReached { .. } | ClassFull { .. } => ErrorCode::CapacityExceeded,
            NotActive { .. } | JoinNotAllowed { .. } => ErrorCode::InvalidState,
            InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            NotAnInstructor { .. }
            | NotInstitutionMember { .. }
            | CourseInstitutionMismatch(_)
            | InsufficientNotice { .. }
            | EndNotAfterStart
            | TooLong { .. }
            | ParticipantsOutOfRange { .. } => ErrorCode::ValidationFailed,
            Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for LiveClassError {
    fn from(err: DomainError) -> Self {
        LiveClassError::Infrastructure(err.to_string())
    }
}

impl From<LiveClassError> for DomainError {
    fn from(err: LiveClassError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_booking_is_conflict() {
        let err = LiveClassError::InstructorConflict {
            existing: LiveClassId::new(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn time_checks_are_validation() {
        assert_eq!(
            LiveClassError::InsufficientNotice { min_minutes: 30 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(LiveClassError::EndNotAfterStart.kind(), ErrorKind::Validation);
    }

    #[test]
    fn role_failure_is_validation() {
        let err = LiveClassError::NotAnInstructor {
            user: UserId::new(),
            role: UserRole::Student,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
