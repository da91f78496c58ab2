//! Subscription status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Free trial window. Converts to Active on payment or is superseded by
    /// a fallback subscription when it lapses.
    Trial,

    /// Paid (or zero-cost fallback) subscription in good standing.
    Active,

    /// Renewal payment failed; still inside the grace window.
    PastDue,

    /// Auto-renew stopped by the subject. Can be reactivated.
    Cancelled,

    /// Ended. Superseded rows stay in this state for the audit trail.
    Expired,
}

impl SubscriptionStatus {
    /// Only Active subscriptions admit new enrollments and attendance.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "TRIAL",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::PastDue => "PAST_DUE",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "TRIAL" => Ok(SubscriptionStatus::Trial),
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "PAST_DUE" => Ok(SubscriptionStatus::PastDue),
            "CANCELLED" => Ok(SubscriptionStatus::Cancelled),
            "EXPIRED" => Ok(SubscriptionStatus::Expired),
            _ => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown status '{}'", s),
            )),
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Trial, Active)
                | (Trial, Expired)
                | (Trial, Cancelled)
                | (Active, Active) // Renewal
                | (Active, PastDue)
                | (Active, Cancelled)
                | (Active, Expired)
                | (PastDue, Active)
                | (PastDue, Cancelled)
                | (PastDue, Expired)
                | (Cancelled, Active) // Reactivation
                | (Cancelled, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Trial => vec![Active, Expired, Cancelled],
            Active => vec![Active, PastDue, Cancelled, Expired],
            PastDue => vec![Active, Cancelled, Expired],
            Cancelled => vec![Active, Expired],
            Expired => vec![],
        }
    }
}
