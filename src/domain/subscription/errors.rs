//! Subscription lifecycle errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NoSubscription / NotFound / TierNotFound | 404 |
//! | InvalidState / TrialNotExpired | 409 |
//! | CapacityExceeded | 422 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::catalog::PlanType;
use crate::domain::foundation::{
    DomainError, ErrorCode, ErrorKind, SubscriptionId, TierId,
};

use super::{Subject, SubscriptionStatus};

/// Subscription-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("No current subscription for {0}")]
    NoSubscription(Subject),

    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    #[error("Tier not found: {0}")]
    TierNotFound(TierId),

    #[error("No active tier is offered for plan {0}")]
    PlanNotOffered(PlanType),

    #[error("Cannot {attempted} subscription in {current} state")]
    InvalidState {
        current: SubscriptionStatus,
        attempted: String,
    },

    #[error("Trial {0} has not expired yet")]
    TrialNotExpired(SubscriptionId),

    #[error("{resource} in use ({used}) exceeds the new limit of {limit}")]
    CapacityExceeded {
        resource: &'static str,
        used: u32,
        limit: u32,
    },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn invalid_state(current: SubscriptionStatus, attempted: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            current,
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NoSubscription(_) | SubscriptionError::NotFound(_) => {
                ErrorCode::SubscriptionNotFound
            }
            SubscriptionError::TierNotFound(_) | SubscriptionError::PlanNotOffered(_) => {
                ErrorCode::TierNotFound
            }
            SubscriptionError::InvalidState { .. } | SubscriptionError::TrialNotExpired(_) => {
                ErrorCode::InvalidState
            }
            SubscriptionError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.kind() {
            ErrorKind::Validation => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[test]
    fn missing_subject_is_not_found() {
        let err = SubscriptionError::NoSubscription(Subject::Student(UserId::new()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn capacity_violation_is_distinct_from_not_found() {
        let err = SubscriptionError::CapacityExceeded {
            resource: "enrollments",
            used: 6,
            limit: 5,
        };
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(err.to_string(), "enrollments in use (6) exceeds the new limit of 5");
    }

    #[test]
    fn invalid_state_message_names_status() {
        let err = SubscriptionError::invalid_state(SubscriptionStatus::Active, "reactivate");
        assert_eq!(err.to_string(), "Cannot reactivate subscription in ACTIVE state");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn domain_validation_keeps_field() {
        let err: SubscriptionError = DomainError::validation("tier_id", "wrong family").into();
        assert_eq!(
            err,
            SubscriptionError::ValidationFailed {
                field: "tier_id".to_string(),
                message: "wrong family".to_string()
            }
        );
    }

    #[test]
    fn database_failure_is_infrastructure() {
        let err: SubscriptionError = DomainError::database("connection reset").into();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }
}
