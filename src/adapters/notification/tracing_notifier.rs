//! Notifier that writes notifications as structured log events.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Notification, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        match &notification {
            Notification::UsageAlert { subject, message } => {
                tracing::info!(
                    target: "lingua_platform::notifications",
                    subject = %subject,
                    message = %message,
                    "Usage alert"
                );
            }
            Notification::LiveClassCancelled {
                user_id,
                live_class_id,
                reason,
            } => {
                tracing::info!(
                    target: "lingua_platform::notifications",
                    user_id = %user_id,
                    live_class_id = %live_class_id,
                    reason = %reason,
                    "Live class cancelled"
                );
            }
        }
        Ok(())
    }
}
