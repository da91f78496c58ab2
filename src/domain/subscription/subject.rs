//! Subscription holders and subscription origins.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{InstitutionId, SubscriptionId, UserId, ValidationError};

/// Who holds a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Student(UserId),
    Institution(InstitutionId),
}

impl Subject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Student(_) => SubjectKind::Student,
            Subject::Institution(_) => SubjectKind::Institution,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Subject::Student(id) => *id.as_uuid(),
            Subject::Institution(id) => *id.as_uuid(),
        }
    }

    pub fn from_parts(kind: SubjectKind, id: Uuid) -> Self {
        match kind {
            SubjectKind::Student => Subject::Student(UserId::from_uuid(id)),
            SubjectKind::Institution => Subject::Institution(InstitutionId::from_uuid(id)),
        }
    }

    pub fn as_institution(&self) -> Option<InstitutionId> {
        match self {
            Subject::Institution(id) => Some(*id),
            Subject::Student(_) => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Student(id) => write!(f, "student {}", id),
            Subject::Institution(id) => write!(f, "institution {}", id),
        }
    }
}

/// Discriminant of [`Subject`], used in URLs and database rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Student,
    Institution,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Student => "student",
            SubjectKind::Institution => "institution",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_lowercase().as_str() {
            "student" | "students" => Ok(SubjectKind::Student),
            "institution" | "institutions" => Ok(SubjectKind::Institution),
            _ => Err(ValidationError::invalid_format(
                "subject_kind",
                format!("expected 'student' or 'institution', got '{}'", s),
            )),
        }
    }
}

/// How a subscription row came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum SubscriptionOrigin {
    /// Purchased directly.
    Regular,
    /// Started as a free trial.
    Trial,
    /// Zero-cost replacement created when `original_id`'s trial lapsed unpaid.
    Fallback { original_id: SubscriptionId },
}

impl SubscriptionOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SubscriptionOrigin::Fallback { .. })
    }

    pub fn is_trial(&self) -> bool {
        matches!(self, SubscriptionOrigin::Trial)
    }
}
