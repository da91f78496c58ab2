use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

/// Live-class session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveClassStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl LiveClassStatus {
    /// Scheduled and Active sessions occupy the instructor's calendar.
    pub fn is_open(&self) -> bool {
        matches!(self, LiveClassStatus::Scheduled | LiveClassStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiveClassStatus::Scheduled => "SCHEDULED",
            LiveClassStatus::Active => "ACTIVE",
            LiveClassStatus::Completed => "COMPLETED",
            LiveClassStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(LiveClassStatus::Scheduled),
            "ACTIVE" => Ok(LiveClassStatus::Active),
            "COMPLETED" => Ok(LiveClassStatus::Completed),
            "CANCELLED" => Ok(LiveClassStatus::Cancelled),
            _ => Err(ValidationError::invalid_format(
                "live_class_status",
                format!("unknown status '{}'", s),
            )),
        }
    }
}

impl std::fmt::Display for LiveClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for LiveClassStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LiveClassStatus::*;
        matches!(
            (self, target),
            (Scheduled, Active) | (Scheduled, Cancelled) | (Active, Completed) | (Active, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LiveClassStatus::*;
        match self {
            Scheduled => vec![Active, Cancelled],
            Active => vec![Completed, Cancelled],
            Completed | Cancelled => vec![],
        }
    }
}
