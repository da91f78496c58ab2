//! Live-class persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, LiveClassId, Timestamp, UserId};
use crate::domain::live_class::LiveClass;

#[async_trait]
pub trait LiveClassRepository: Send + Sync {
    /// Insert a new session.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the instructor already has an open session
    ///   overlapping this one
    async fn save(&self, live_class: &LiveClass) -> Result<(), DomainError>;

    /// Overwrite status and cancellation fields. The participant list is
    /// left as stored; it only changes through `add_participant` and
    /// `remove_participant`.
    async fn update(&self, live_class: &LiveClass) -> Result<(), DomainError>;

    /// Add `user` to the session if it is ACTIVE, under its cap and the
    /// user is not already in it, checked and written as one step.
    ///
    /// Returns the updated session, or `None` when any condition fails, in
    /// which case nothing is written.
    ///
    /// # Errors
    ///
    /// - `LiveClassNotFound` if no such session exists
    async fn add_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<Option<LiveClass>, DomainError>;

    /// Take `user` back out of the session. A user who is not in it is
    /// ignored.
    ///
    /// # Errors
    ///
    /// - `LiveClassNotFound` if no such session exists
    async fn remove_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: LiveClassId) -> Result<Option<LiveClass>, DomainError>;

    /// Scheduled or Active sessions of an instructor.
    async fn find_open_for_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<LiveClass>, DomainError>;

    /// Scheduled or Active sessions of a course.
    async fn find_open_for_course(&self, course_id: CourseId) -> Result<Vec<LiveClass>, DomainError>;

    /// Scheduled sessions of an instructor starting at or after `from`.
    async fn find_scheduled_from(
        &self,
        instructor_id: UserId,
        from: Timestamp,
    ) -> Result<Vec<LiveClass>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_class_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LiveClassRepository) {}
    }
}
