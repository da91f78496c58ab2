//! Scheduling bounds for live classes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{LiveClassError, TimeWindow};

/// Time and size bounds a proposed session must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveClassPolicy {
    pub min_notice_minutes: i64,
    pub max_duration_minutes: i64,
    pub min_participants: u32,
    pub max_participants: u32,
}

impl Default for LiveClassPolicy {
    fn default() -> Self {
        Self {
            min_notice_minutes: 30,
            max_duration_minutes: 240,
            min_participants: 1,
            max_participants: 100,
        }
    }
}

impl LiveClassPolicy {
    /// Start at least `min_notice_minutes` from `now`, end after start,
    /// duration at most `max_duration_minutes`.
    pub fn check_schedule(&self, window: &TimeWindow, now: Timestamp) -> Result<(), LiveClassError> {
        if window.start < now.add_minutes(self.min_notice_minutes) {
            return Err(LiveClassError::InsufficientNotice {
                min_minutes: self.min_notice_minutes,
            });
        }
        if window.is_empty() {
            return Err(LiveClassError::EndNotAfterStart);
        }
        let actual_minutes = window.duration_minutes();
        if actual_minutes > self.max_duration_minutes {
            return Err(LiveClassError::TooLong {
                max_minutes: self.max_duration_minutes,
                actual_minutes,
            });
        }
        Ok(())
    }

    pub fn check_participants(&self, max_participants: u32) -> Result<(), LiveClassError> {
        if max_participants < self.min_participants || max_participants > self.max_participants {
            return Err(LiveClassError::ParticipantsOutOfRange {
                min: self.min_participants,
                max: self.max_participants,
                actual: max_participants,
            });
        }
        Ok(())
    }
}
