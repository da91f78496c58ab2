//! In-memory courses and enrollments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::enrollment::{Course, Enrollment};
use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, InstitutionId, UserId,
};
use crate::ports::{CourseRepository, EnrollmentRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, course: Course) {
        self.courses.write().await.insert(course.id, course);
    }

    fn not_found(id: CourseId) -> DomainError {
        DomainError::new(ErrorCode::CourseNotFound, format!("Course not found: {}", id))
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn try_take_seat(&self, id: CourseId) -> Result<bool, DomainError> {
        let mut courses = self.courses.write().await;
        let course = courses.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if course.is_full() {
            return Ok(false);
        }
        course.current_enrollments += 1;
        Ok(true)
    }

    async fn release_seat(&self, id: CourseId) -> Result<(), DomainError> {
        let mut courses = self.courses.write().await;
        let course = courses.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        course.current_enrollments = course.current_enrollments.saturating_sub(1);
        Ok(())
    }
}

/// In-memory enrollments. Needs the course store to attribute enrollments
/// to institutions.
#[derive(Debug, Clone)]
pub struct InMemoryEnrollmentRepository {
    enrollments: Arc<RwLock<HashMap<EnrollmentId, Enrollment>>>,
    courses: InMemoryCourseRepository,
}

impl InMemoryEnrollmentRepository {
    pub fn new(courses: InMemoryCourseRepository) -> Self {
        Self {
            enrollments: Arc::new(RwLock::new(HashMap::new())),
            courses,
        }
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn create(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut enrollments = self.enrollments.write().await;
        let duplicate = enrollment.is_active()
            && enrollments.values().any(|e| {
                e.is_active() && e.user_id == enrollment.user_id && e.course_id == enrollment.course_id
            });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!(
                    "User {} already has an active enrollment in course {}",
                    enrollment.user_id, enrollment.course_id
                ),
            ));
        }
        enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.get_mut(&enrollment.id) {
            Some(row) => {
                *row = enrollment.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::EnrollmentNotFound,
                format!("Enrollment not found: {}", enrollment.id),
            )),
        }
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, DomainError> {
        Ok(self.enrollments.read().await.get(&id).cloned())
    }

    async fn find_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .find(|e| e.is_active() && e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn count_active_for_user(&self, user_id: UserId) -> Result<u32, DomainError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| e.is_active() && e.user_id == user_id)
            .count() as u32)
    }

    async fn count_active_for_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u32, DomainError> {
        let course_ids: Vec<CourseId> = self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| e.is_active())
            .map(|e| e.course_id)
            .collect();

        let mut count = 0;
        for course_id in course_ids {
            if let Some(course) = self.courses.find_by_id(course_id).await? {
                if course.institution_id == Some(institution_id) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn course(max: Option<u32>) -> Course {
        Course {
            id: CourseId::new(),
            title: "French B1".to_string(),
            institution_id: None,
            is_platform_course: true,
            requires_subscription: false,
            subscription_tier: None,
            max_students: max,
            current_enrollments: 0,
        }
    }

    #[tokio::test]
    async fn seats_run_out() {
        let courses = InMemoryCourseRepository::new();
        let c = course(Some(1));
        courses.insert(c.clone()).await;
        assert!(courses.try_take_seat(c.id).await.unwrap());
        assert!(!courses.try_take_seat(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn second_active_enrollment_conflicts() {
        let courses = InMemoryCourseRepository::new();
        let repo = InMemoryEnrollmentRepository::new(courses);
        let user = UserId::new();
        let course_id = CourseId::new();
        repo.create(&Enrollment::direct(user, course_id, Timestamp::now()))
            .await
            .unwrap();
        let err = repo
            .create(&Enrollment::direct(user, course_id, Timestamp::now()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}
