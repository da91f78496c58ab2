//! Notifier port - delivery of advisory notifications.
//!
//! Delivery itself (email, push, in-app) is outside governance; callers
//! only hand over the message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, LiveClassId, UserId};
use crate::domain::subscription::Subject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A usage counter crossed the alert threshold.
    UsageAlert { subject: Subject, message: String },
    /// A live class the user joined was cancelled.
    LiveClassCancelled {
        user_id: UserId,
        live_class_id: LiveClassId,
        reason: String,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError>;
}
