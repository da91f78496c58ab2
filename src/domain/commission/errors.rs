//! Commission engine errors.
//!
//! Each step of the payment → enrollment → course → institution →
//! subscription → commission tier chain fails with its own variant.

use thiserror::Error;

use crate::domain::catalog::PlanType;
use crate::domain::directory::PaymentStatus;
use crate::domain::foundation::{
    CommissionId, CourseId, DomainError, EnrollmentId, ErrorCode, ErrorKind, InstitutionId,
    Money, PaymentId,
};
use crate::domain::subscription::SubscriptionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommissionError {
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("Payment {payment} is {status}, not COMPLETED")]
    PaymentNotCompleted {
        payment: PaymentId,
        status: PaymentStatus,
    },

    #[error("Payment {0} is not linked to an enrollment")]
    PaymentWithoutEnrollment(PaymentId),

    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(EnrollmentId),

    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Course {0} does not belong to an institution")]
    CourseWithoutInstitution(CourseId),

    #[error("Institution not found: {0}")]
    InstitutionNotFound(InstitutionId),

    #[error("Institution {0} has no subscription")]
    NoSubscription(InstitutionId),

    #[error("Subscription of institution {institution} is {status}, not ACTIVE")]
    SubscriptionInactive {
        institution: InstitutionId,
        status: SubscriptionStatus,
    },

    #[error("No commission tier for plan {0}")]
    CommissionTierNotFound(PlanType),

    #[error("Commission {0} has already been paid out")]
    AlreadyPaid(CommissionId),

    #[error("Institution {0} has no pending commissions")]
    NoPendingCommissions(InstitutionId),

    #[error("Requested payout {requested} exceeds pending commissions of {pending}")]
    PayoutExceedsPending { requested: Money, pending: Money },

    #[error("Pending commissions of institution {0} changed during the payout, retry")]
    PayoutConflict(InstitutionId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl CommissionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CommissionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CommissionError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            CommissionError::EnrollmentNotFound(_) | CommissionError::PaymentWithoutEnrollment(_) => {
                ErrorCode::EnrollmentNotFound
            }
            CommissionError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            CommissionError::CourseWithoutInstitution(_) | CommissionError::InstitutionNotFound(_) => {
                ErrorCode::InstitutionNotFound
            }
            CommissionError::NoSubscription(_) => ErrorCode::SubscriptionNotFound,
            CommissionError::CommissionTierNotFound(_) => ErrorCode::CommissionTierNotFound,
            CommissionError::PaymentNotCompleted { .. }
            | CommissionError::SubscriptionInactive { .. }
            | CommissionError::AlreadyPaid(_)
            | CommissionError::NoPendingCommissions(_) => ErrorCode::InvalidState,
            CommissionError::PayoutExceedsPending { .. } => ErrorCode::CapacityExceeded,
            CommissionError::PayoutConflict(_) => ErrorCode::Conflict,
            CommissionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CommissionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for CommissionError {
    fn from(err: DomainError) -> Self {
        CommissionError::Infrastructure(err.to_string())
    }
}

impl From<CommissionError> for DomainError {
    fn from(err: CommissionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
