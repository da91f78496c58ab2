//! CompleteLiveClassHandler - Moves a session to COMPLETED.

use std::sync::Arc;

use crate::domain::foundation::{LiveClassId, Timestamp};
use crate::domain::live_class::{LiveClass, LiveClassError};
use crate::ports::LiveClassRepository;

#[derive(Debug, Clone)]
pub struct CompleteLiveClassCommand {
    pub live_class_id: LiveClassId,
}

pub struct CompleteLiveClassHandler {
    live_classes: Arc<dyn LiveClassRepository>,
}

impl CompleteLiveClassHandler {
    pub fn new(live_classes: Arc<dyn LiveClassRepository>) -> Self {
        Self { live_classes }
    }

    pub async fn handle(&self, cmd: CompleteLiveClassCommand) -> Result<LiveClass, LiveClassError> {
        let mut live_class = self
            .live_classes
            .find_by_id(cmd.live_class_id)
            .await?
            .ok_or(LiveClassError::NotFound(cmd.live_class_id))?;

        live_class.complete(Timestamp::now())?;
        self.live_classes.update(&live_class).await?;

        tracing::info!(live_class_id = %live_class.id, "Live class completed");
        Ok(live_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::live_class::fixtures::{instructor, proposal};
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::live_class::LiveClassStatus;

    #[tokio::test]
    async fn scheduled_session_cannot_complete() {
        let platform = TestPlatform::new();
        let host = instructor(&platform, None).await;
        let session = LiveClass::schedule(proposal(&host, 60), Timestamp::now());
        platform.live_classes.save(&session).await.unwrap();

        let err = CompleteLiveClassHandler::new(platform.live_class_port())
            .handle(CompleteLiveClassCommand {
                live_class_id: session.id,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LiveClassError::InvalidTransition {
                from: LiveClassStatus::Scheduled,
                to: LiveClassStatus::Completed
            }
        );
    }
}
