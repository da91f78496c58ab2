//! Live-class session entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CourseId, InstitutionId, LiveClassId, StateMachine, Timestamp, UserId,
};

use super::{LiveClassError, LiveClassStatus, TimeWindow};

/// A scheduled live-class session.
///
/// # Invariants
///
/// - No two open sessions of one instructor have overlapping windows
/// - `participants.len() <= max_participants`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveClass {
    pub id: LiveClassId,
    pub title: String,
    pub instructor_id: UserId,
    pub institution_id: Option<InstitutionId>,
    pub course_id: Option<CourseId>,
    pub window: TimeWindow,
    pub status: LiveClassStatus,
    pub max_participants: u32,
    pub participants: Vec<UserId>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Requested shape of a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveClassProposal {
    pub title: String,
    pub instructor_id: UserId,
    pub institution_id: Option<InstitutionId>,
    pub course_id: Option<CourseId>,
    pub window: TimeWindow,
    pub max_participants: u32,
}

impl LiveClass {
    pub fn schedule(proposal: LiveClassProposal, now: Timestamp) -> Self {
        Self {
            id: LiveClassId::new(),
            title: proposal.title,
            instructor_id: proposal.instructor_id,
            institution_id: proposal.institution_id,
            course_id: proposal.course_id,
            window: proposal.window,
            status: LiveClassStatus::Scheduled,
            max_participants: proposal.max_participants,
            participants: Vec::new(),
            cancellation_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() as u32 >= self.max_participants
    }

    pub fn has_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    /// Whether a user may join right now, short of subscription checks.
    pub fn check_joinable(&self, user: UserId) -> Result<(), LiveClassError> {
        if self.status != LiveClassStatus::Active {
            return Err(LiveClassError::NotActive {
                id: self.id,
                status: self.status,
            });
        }
        if self.is_full() {
            return Err(LiveClassError::ClassFull {
                max: self.max_participants,
            });
        }
        if self.has_participant(user) {
            return Err(LiveClassError::AlreadyJoined(user));
        }
        Ok(())
    }

    pub fn add_participant(&mut self, user: UserId, now: Timestamp) -> Result<(), LiveClassError> {
        self.check_joinable(user)?;
        self.participants.push(user);
        self.updated_at = now;
        Ok(())
    }

    pub fn start(&mut self, now: Timestamp) -> Result<(), LiveClassError> {
        self.transition_to(LiveClassStatus::Active, now)
    }

    pub fn complete(&mut self, now: Timestamp) -> Result<(), LiveClassError> {
        self.transition_to(LiveClassStatus::Completed, now)
    }

    pub fn cancel(&mut self, reason: impl Into<String>, now: Timestamp) -> Result<(), LiveClassError> {
        self.transition_to(LiveClassStatus::Cancelled, now)?;
        self.cancellation_reason = Some(reason.into());
        self.cancelled_at = Some(now);
        Ok(())
    }

    fn transition_to(&mut self, target: LiveClassStatus, now: Timestamp) -> Result<(), LiveClassError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| LiveClassError::InvalidTransition {
                from: self.status,
                to: target,
            })?;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(max: u32) -> LiveClass {
        let start = Timestamp::now().add_hours(2);
        LiveClass::schedule(
            LiveClassProposal {
                title: "Conversation club".to_string(),
                instructor_id: UserId::new(),
                institution_id: None,
                course_id: None,
                window: TimeWindow::new(start, start.add_hours(1)),
                max_participants: max,
            },
            Timestamp::now(),
        )
    }

    #[test]
    fn scheduled_session_cannot_be_joined() {
        let s = session(10);
        assert!(matches!(
            s.check_joinable(UserId::new()),
            Err(LiveClassError::NotActive { .. })
        ));
    }

    #[test]
    fn join_respects_cap_and_duplicates() {
        let mut s = session(1);
        s.start(Timestamp::now()).unwrap();
        let user = UserId::new();
        s.add_participant(user, Timestamp::now()).unwrap();

        assert_eq!(
            s.check_joinable(user),
            Err(LiveClassError::ClassFull { max: 1 })
        );

        let mut roomy = session(5);
        roomy.start(Timestamp::now()).unwrap();
        roomy.add_participant(user, Timestamp::now()).unwrap();
        assert_eq!(
            roomy.add_participant(user, Timestamp::now()),
            Err(LiveClassError::AlreadyJoined(user))
        );
    }

    #[test]
    fn cancel_records_reason() {
        let mut s = session(10);
        let now = Timestamp::now();
        s.cancel("Instructor unavailable", now).unwrap();
        assert_eq!(s.status, LiveClassStatus::Cancelled);
        assert_eq!(s.cancellation_reason.as_deref(), Some("Instructor unavailable"));
        assert_eq!(s.cancelled_at, Some(now));
    }

    #[test]
    fn completed_session_cannot_restart() {
        let mut s = session(10);
        s.start(Timestamp::now()).unwrap();
        s.complete(Timestamp::now()).unwrap();
        assert_eq!(
            s.start(Timestamp::now()),
            Err(LiveClassError::InvalidTransition {
                from: LiveClassStatus::Completed,
                to: LiveClassStatus::Active
            })
        );
    }
}
