//! CreateLiveClassHandler - Validates and schedules a live class.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, Timestamp};
use crate::domain::live_class::{LiveClass, LiveClassError, LiveClassProposal};
use crate::ports::LiveClassRepository;

use super::ValidateLiveClassCreationHandler;

#[derive(Debug, Clone, Serialize)]
pub struct CreateLiveClassResult {
    pub live_class: LiveClass,
    pub warnings: Vec<String>,
}

pub struct CreateLiveClassHandler {
    validator: Arc<ValidateLiveClassCreationHandler>,
    live_classes: Arc<dyn LiveClassRepository>,
}

impl CreateLiveClassHandler {
    pub fn new(
        validator: Arc<ValidateLiveClassCreationHandler>,
        live_classes: Arc<dyn LiveClassRepository>,
    ) -> Self {
        Self {
            validator,
            live_classes,
        }
    }

    pub async fn handle(&self, proposal: LiveClassProposal) -> Result<CreateLiveClassResult, LiveClassError> {
        let validation = self.validator.handle(&proposal).await?;
        let live_class = LiveClass::schedule(proposal, Timestamp::now());

        // The store rejects overlaps again; a concurrent booking can win
        // between validation and insert.
        if let Err(e) = self.live_classes.save(&live_class).await {
            if e.code != ErrorCode::Conflict {
                return Err(e.into());
            }
            let existing = self
                .live_classes
                .find_open_for_instructor(live_class.instructor_id)
                .await?
                .into_iter()
                .find(|s| s.window.overlaps(&live_class.window))
                .map(|s| s.id)
                .ok_or_else(|| LiveClassError::Infrastructure(e.message.clone()))?;
            return Err(LiveClassError::InstructorConflict { existing });
        }

        tracing::info!(
            live_class_id = %live_class.id,
            instructor_id = %live_class.instructor_id,
            start = %live_class.window.start,
            end = %live_class.window.end,
            "Live class scheduled"
        );

        Ok(CreateLiveClassResult {
            live_class,
            warnings: validation.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::live_class::fixtures::{instructor, proposal, validator};
    use crate::application::handlers::test_support::TestPlatform;
    use crate::domain::live_class::{LiveClassStatus, TimeWindow};

    fn handler(platform: &TestPlatform) -> CreateLiveClassHandler {
        CreateLiveClassHandler::new(Arc::new(validator(platform)), platform.live_class_port())
    }

    #[tokio::test]
    async fn creates_scheduled_session() {
        let platform = TestPlatform::new();
        let host = instructor(&platform, None).await;

        let result = handler(&platform).handle(proposal(&host, 60)).await.unwrap();

        assert_eq!(result.live_class.status, LiveClassStatus::Scheduled);
        assert!(result.warnings.is_empty());
        assert!(platform
            .live_classes
            .find_by_id(result.live_class.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn second_overlapping_request_is_rejected_either_order() {
        for reverse in [false, true] {
            let platform = TestPlatform::new();
            let host = instructor(&platform, None).await;
            let a = proposal(&host, 120);
            let mut b = a.clone();
            b.window = TimeWindow::new(a.window.start.add_minutes(30), a.window.end.add_minutes(30));
            let (first, second) = if reverse { (b, a) } else { (a, b) };

            let handler = handler(&platform);
            handler.handle(first).await.unwrap();
            assert!(matches!(
                handler.handle(second).await,
                Err(LiveClassError::InstructorConflict { .. })
            ));
        }
    }
}
