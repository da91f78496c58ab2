//! Enrollment domain - courses, enrollments and access resolution.

mod course;
#[allow(clippy::module_inception)]
mod enrollment;
mod errors;

pub use course::Course;
pub use enrollment::{AccessMethod, CourseAccess, Enrollment, EnrollmentStatus};
pub use errors::EnrollmentError;
