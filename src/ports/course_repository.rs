//! Course and enrollment persistence ports.

use async_trait::async_trait;

use crate::domain::enrollment::{Course, Enrollment};
use crate::domain::foundation::{CourseId, DomainError, EnrollmentId, InstitutionId, UserId};

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, DomainError>;

    /// Atomically take one seat. Returns `false` when the course is at
    /// `max_students`.
    async fn try_take_seat(&self, id: CourseId) -> Result<bool, DomainError>;

    /// Give back one seat.
    async fn release_seat(&self, id: CourseId) -> Result<(), DomainError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert a new enrollment.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the student already has an active enrollment in
    ///   the course
    async fn create(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, DomainError>;

    async fn find_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, DomainError>;

    /// Active enrollments held by a student.
    async fn count_active_for_user(&self, user_id: UserId) -> Result<u32, DomainError>;

    /// Active enrollments in an institution's courses.
    async fn count_active_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u32, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CourseRepository) {}
    }

    #[test]
    fn enrollment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn EnrollmentRepository) {}
    }
}
