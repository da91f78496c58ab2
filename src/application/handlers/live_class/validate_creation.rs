//! ValidateLiveClassCreationHandler - Ordered admission gate for new sessions.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. instructor exists and may host
//! 2. no overlap with the instructor's open sessions
//! 3. institution exists and the instructor belongs to it
//! 4. course exists and belongs to that institution
//! 5. the instructor's live-class limit is not reached
//! 6. notice, ordering and duration bounds
//! 7. participant bounds
//!
//! Overlap with another session of the same course is only a warning.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::directory::User;
use crate::domain::foundation::{InstitutionId, Timestamp};
use crate::domain::live_class::{LiveClassError, LiveClassPolicy, LiveClassProposal};
use crate::domain::subscription::Subject;
use crate::ports::{CourseRepository, Directory, LiveClassRepository, SubscriptionRepository};

/// Outcome of a passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveClassValidation {
    pub warnings: Vec<String>,
    pub live_class_limit: u32,
    pub upcoming_live_classes: u32,
}

pub struct ValidateLiveClassCreationHandler {
    directory: Arc<dyn Directory>,
    courses: Arc<dyn CourseRepository>,
    live_classes: Arc<dyn LiveClassRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    policy: LiveClassPolicy,
    default_max_live_classes: u32,
}

impl ValidateLiveClassCreationHandler {
    pub fn new(
        directory: Arc<dyn Directory>,
        courses: Arc<dyn CourseRepository>,
        live_classes: Arc<dyn LiveClassRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        policy: LiveClassPolicy,
        default_max_live_classes: u32,
    ) -> Self {
        Self {
            directory,
            courses,
            live_classes,
            subscriptions,
            policy,
            default_max_live_classes,
        }
    }

    pub async fn handle(&self, proposal: &LiveClassProposal) -> Result<LiveClassValidation, LiveClassError> {
        let now = Timestamp::now();

        // 1. role
        let instructor = self
            .directory
            .find_user(proposal.instructor_id)
            .await?
            .ok_or(LiveClassError::InstructorNotFound(proposal.instructor_id))?;
        if !instructor.role.can_host_live_classes() {
            return Err(LiveClassError::NotAnInstructor {
                user: instructor.id,
                role: instructor.role,
            });
        }

        // 2. instructor calendar
        let open = self
            .live_classes
            .find_open_for_instructor(instructor.id)
            .await?;
        if let Some(existing) = open.iter().find(|s| s.window.overlaps(&proposal.window)) {
            return Err(LiveClassError::InstructorConflict {
                existing: existing.id,
            });
        }

        // 3. institution
        if let Some(institution_id) = proposal.institution_id {
            self.check_institution(&instructor, institution_id).await?;
        }

        // 4. course
        let mut warnings = Vec::new();
        if let Some(course_id) = proposal.course_id {
            let course = self
                .courses
                .find_by_id(course_id)
                .await?
                .ok_or(LiveClassError::CourseNotFound(course_id))?;
            if course.institution_id != proposal.institution_id {
                return Err(LiveClassError::CourseInstitutionMismatch(course_id));
            }

            let course_sessions = self.live_classes.find_open_for_course(course_id).await?;
            for session in course_sessions
                .iter()
                .filter(|s| s.window.overlaps(&proposal.window))
            {
                warnings.push(format!(
                    "Overlaps live class '{}' of the same course ({} - {})",
                    session.title, session.window.start, session.window.end
                ));
            }
        }

        // 5. limit
        let limit = self
            .live_class_limit(&instructor, proposal.institution_id)
            .await?;
        let upcoming = open.iter().filter(|s| s.window.end > now).count() as u32;
        if upcoming >= limit {
            return Err(LiveClassError::LiveClassLimitReached { limit, upcoming });
        }

        // 6. time
        self.policy.check_schedule(&proposal.window, now)?;

        // 7. participants
        self.policy.check_participants(proposal.max_participants)?;

        if !warnings.is_empty() {
            tracing::warn!(
                instructor_id = %instructor.id,
                warnings = warnings.len(),
                "Live class overlaps other sessions of its course"
            );
        }

        Ok(LiveClassValidation {
            warnings,
            live_class_limit: limit,
            upcoming_live_classes: upcoming,
        })
    }

    async fn check_institution(
        &self,
        instructor: &User,
        institution_id: InstitutionId,
    ) -> Result<(), LiveClassError> {
        if self
            .directory
            .find_institution(institution_id)
            .await?
            .is_none()
        {
            return Err(LiveClassError::InstitutionNotFound(institution_id));
        }
        if !instructor.belongs_to(institution_id) {
            return Err(LiveClassError::NotInstitutionMember {
                instructor: instructor.id,
                institution: institution_id,
            });
        }
        Ok(())
    }

    /// Instructor's own subscription tier, then the institution's tier,
    /// then the configured default.
    async fn live_class_limit(
        &self,
        instructor: &User,
        institution_id: Option<InstitutionId>,
    ) -> Result<u32, LiveClassError> {
        if let Some(own) = self
            .subscriptions
            .find_current(Subject::Student(instructor.id))
            .await?
        {
            return Ok(own.limits.max_live_classes);
        }
        if let Some(institution_id) = institution_id {
            if let Some(institution) = self
                .subscriptions
                .find_current(Subject::Institution(institution_id))
                .await?
            {
                return Ok(institution.limits.max_live_classes);
            }
        }
        Ok(self.default_max_live_classes)
    }
}
