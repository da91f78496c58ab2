//! StartLiveClassHandler - Moves a session to ACTIVE.

use std::sync::Arc;

use crate::domain::foundation::{LiveClassId, Timestamp};
use crate::domain::live_class::{LiveClass, LiveClassError};
use crate::ports::LiveClassRepository;

#[derive(Debug, Clone)]
pub struct StartLiveClassCommand {
    pub live_class_id: LiveClassId,
}

pub struct StartLiveClassHandler {
    live_classes: Arc<dyn LiveClassRepository>,
}

impl StartLiveClassHandler {
    pub fn new(live_classes: Arc<dyn LiveClassRepository>) -> Self {
        Self { live_classes }
    }

    pub async fn handle(&self, cmd: StartLiveClassCommand) -> Result<LiveClass, LiveClassError> {
        let mut live_class = self
            .live_classes
            .find_by_id(cmd.live_class_id)
            .await?
            .ok_or(LiveClassError::NotFound(cmd.live_class_id))?;

        live_class.start(Timestamp::now())?;
        self.live_classes.update(&live_class).await?;

        tracing::info!(live_class_id = %live_class.id, "Live class started");
        Ok(live_class)
    }
}
