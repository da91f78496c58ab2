//! Notifier that keeps every notification in memory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{Notification, Notifier};

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    pub async fn usage_alerts(&self) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .filter_map(|n| match n {
                Notification::UsageAlert { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        self.sent.write().await.push(notification);
        Ok(())
    }
}
