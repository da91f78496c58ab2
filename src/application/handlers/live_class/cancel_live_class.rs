//! CancelLiveClassHandler - Cancels one session and tells its participants.

use std::sync::Arc;

use crate::domain::foundation::{LiveClassId, Timestamp};
use crate::domain::live_class::{LiveClass, LiveClassError};
use crate::ports::{LiveClassRepository, Notifier};

use super::notify_cancellation;

#[derive(Debug, Clone)]
pub struct CancelLiveClassCommand {
    pub live_class_id: LiveClassId,
    pub reason: String,
}

pub struct CancelLiveClassHandler {
    live_classes: Arc<dyn LiveClassRepository>,
    notifier: Arc<dyn Notifier>,
}

impl CancelLiveClassHandler {
    pub fn new(live_classes: Arc<dyn LiveClassRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            live_classes,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: CancelLiveClassCommand) -> Result<LiveClass, LiveClassError> {
        let mut live_class = self
            .live_classes
            .find_by_id(cmd.live_class_id)
            .await?
            .ok_or(LiveClassError::NotFound(cmd.live_class_id))?;

        live_class.cancel(cmd.reason, Timestamp::now())?;
        self.live_classes.update(&live_class).await?;

        let notified = notify_cancellation(&self.notifier, &live_class).await;
        tracing::info!(
            live_class_id = %live_class.id,
            notified,
            "Live class cancelled"
        );
        Ok(live_class)
    }
}
