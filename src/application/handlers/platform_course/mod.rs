//! Platform-course governance handlers.
//!
//! Subscription-gated courses consume enrollment quota; other courses only
//! take a seat against `max_students`.

mod cancel_enrollment;
mod check_access;
mod enroll;

pub use cancel_enrollment::{CancelEnrollmentCommand, CancelEnrollmentHandler};
pub use check_access::{CheckCourseAccessHandler, CheckCourseAccessQuery};
pub use enroll::{EnrollInCourseCommand, EnrollInCourseHandler, EnrollInCourseResult};
