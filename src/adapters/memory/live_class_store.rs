//! In-memory live-class sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, LiveClassId, Timestamp, UserId};
use crate::domain::live_class::{LiveClass, LiveClassStatus};
use crate::ports::LiveClassRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLiveClassRepository {
    sessions: Arc<RwLock<HashMap<LiveClassId, LiveClass>>>,
}

impl InMemoryLiveClassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: LiveClassId) -> DomainError {
        DomainError::new(ErrorCode::LiveClassNotFound, format!("Live class not found: {}", id))
    }

    fn sorted(mut sessions: Vec<LiveClass>) -> Vec<LiveClass> {
        sessions.sort_by_key(|s| s.window.start);
        sessions
    }
}

#[async_trait]
impl LiveClassRepository for InMemoryLiveClassRepository {
    async fn save(&self, live_class: &LiveClass) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let clash = sessions.values().find(|s| {
            s.instructor_id == live_class.instructor_id
                && s.status.is_open()
                && s.window.overlaps(&live_class.window)
        });
        if let Some(existing) = clash {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Instructor already has live class {} in this time slot", existing.id),
            ));
        }
        sessions.insert(live_class.id, live_class.clone());
        Ok(())
    }

    async fn update(&self, live_class: &LiveClass) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let row = sessions
            .get_mut(&live_class.id)
            .ok_or_else(|| Self::not_found(live_class.id))?;
        let participants = std::mem::take(&mut row.participants);
        *row = live_class.clone();
        row.participants = participants;
        Ok(())
    }

    async fn add_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<Option<LiveClass>, DomainError> {
        let mut sessions = self.sessions.write().await;
        let row = sessions.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        Ok(row.add_participant(user, now).ok().map(|_| row.clone()))
    }

    async fn remove_participant(
        &self,
        id: LiveClassId,
        user: UserId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let row = sessions.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if row.has_participant(user) {
            row.participants.retain(|p| *p != user);
            row.updated_at = now;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: LiveClassId) -> Result<Option<LiveClass>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_open_for_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<LiveClass>, DomainError> {
        Ok(Self::sorted(
            self.sessions
                .read()
                .await
                .values()
                .filter(|s| s.instructor_id == instructor_id && s.status.is_open())
                .cloned()
                .collect(),
        ))
    }

    async fn find_open_for_course(&self, course_id: CourseId) -> Result<Vec<LiveClass>, DomainError> {
        Ok(Self::sorted(
            self.sessions
                .read()
                .await
                .values()
                .filter(|s| s.course_id == Some(course_id) && s.status.is_open())
                .cloned()
                .collect(),
        ))
    }

    async fn find_scheduled_from(
        &self,
        instructor_id: UserId,
        from: Timestamp,
    ) -> Result<Vec<LiveClass>, DomainError> {
        Ok(Self::sorted(
            self.sessions
                .read()
                .await
                .values()
                .filter(|s| {
                    s.instructor_id == instructor_id
                        && s.status == LiveClassStatus::Scheduled
                        && s.window.start >= from
                })
                .cloned()
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::live_class::{LiveClassProposal, TimeWindow};

    fn active_session(max_participants: u32) -> LiveClass {
        let now = Timestamp::now();
        let mut session = LiveClass::schedule(
            LiveClassProposal {
                title: "Conversation hour".to_string(),
                instructor_id: UserId::new(),
                institution_id: None,
                course_id: None,
                window: TimeWindow::new(now, now.add_minutes(60)),
                max_participants,
            },
            now,
        );
        session.start(now).unwrap();
        session
    }

    #[tokio::test]
    async fn add_participant_stops_at_the_cap() {
        let repo = InMemoryLiveClassRepository::new();
        let session = active_session(1);
        repo.save(&session).await.unwrap();

        let first = repo
            .add_participant(session.id, UserId::new(), Timestamp::now())
            .await
            .unwrap();
        assert_eq!(first.unwrap().participants.len(), 1);

        let second = repo
            .add_participant(session.id, UserId::new(), Timestamp::now())
            .await
            .unwrap();
        assert!(second.is_none());
        let stored = repo.find_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.participants.len(), 1);
    }

    #[tokio::test]
    async fn add_participant_refuses_the_same_user_twice() {
        let repo = InMemoryLiveClassRepository::new();
        let session = active_session(10);
        repo.save(&session).await.unwrap();
        let user = UserId::new();

        assert!(repo
            .add_participant(session.id, user, Timestamp::now())
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .add_participant(session.id, user, Timestamp::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn add_participant_on_unknown_session_is_not_found() {
        let repo = InMemoryLiveClassRepository::new();
        let err = repo
            .add_participant(LiveClassId::new(), UserId::new(), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LiveClassNotFound);
    }

    #[tokio::test]
    async fn update_from_stale_copy_keeps_participants() {
        let repo = InMemoryLiveClassRepository::new();
        let mut stale = active_session(10);
        repo.save(&stale).await.unwrap();
        let user = UserId::new();
        repo.add_participant(stale.id, user, Timestamp::now())
            .await
            .unwrap();

        stale.complete(Timestamp::now()).unwrap();
        repo.update(&stale).await.unwrap();

        let stored = repo.find_by_id(stale.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LiveClassStatus::Completed);
        assert!(stored.has_participant(user));
    }

    #[tokio::test]
    async fn remove_participant_frees_the_seat() {
        let repo = InMemoryLiveClassRepository::new();
        let session = active_session(1);
        repo.save(&session).await.unwrap();
        let user = UserId::new();
        repo.add_participant(session.id, user, Timestamp::now())
            .await
            .unwrap();

        repo.remove_participant(session.id, user, Timestamp::now())
            .await
            .unwrap();

        assert!(repo
            .add_participant(session.id, UserId::new(), Timestamp::now())
            .await
            .unwrap()
            .is_some());
    }
}
