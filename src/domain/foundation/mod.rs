//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, money, error types and the state
//! machine trait that form the vocabulary of the governance domain.

mod errors;
mod ids;
mod money;
mod percentage;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use ids::{
    CommissionId, CourseId, EnrollmentId, InstitutionId, LiveClassId, LogEntryId, PaymentId,
    PayoutId, SubscriptionId, TierId, UserId,
};
pub use money::{CommissionRate, Money};
pub use percentage::Percentage;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
