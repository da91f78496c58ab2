//! Row decoding and error mapping shared by the Postgres adapters.

use crate::domain::catalog::{InstitutionPlan, PlanType, StudentPlan};
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Wraps a driver error with the operation that failed.
pub(crate) fn db_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}

/// True when `err` is a violation of the named constraint or index.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// A stored value that no longer decodes into the domain type.
pub(crate) fn corrupt(err: ValidationError) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored value: {}", err))
}

/// Plan names are unique across both families.
pub(crate) fn parse_plan(s: &str) -> Result<PlanType, DomainError> {
    if let Ok(plan) = StudentPlan::parse(s) {
        return Ok(PlanType::Student(plan));
    }
    InstitutionPlan::parse(s)
        .map(PlanType::Institution)
        .map_err(corrupt)
}

pub(crate) fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

pub(crate) fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_names_resolve_to_their_family() {
        assert_eq!(parse_plan("PREMIUM").unwrap(), PlanType::Student(StudentPlan::Premium));
        assert_eq!(
            parse_plan("ENTERPRISE").unwrap(),
            PlanType::Institution(InstitutionPlan::Enterprise)
        );
        assert!(parse_plan("PLATINUM").is_err());
    }

    #[test]
    fn negative_counters_decode_as_zero() {
        assert_eq!(to_u32(-3), 0);
        assert_eq!(to_u32(7), 7);
    }
}
