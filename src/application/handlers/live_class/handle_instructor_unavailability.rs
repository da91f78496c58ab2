//! HandleInstructorUnavailabilityHandler - Bulk-cancels an instructor's
//! upcoming sessions.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::batch::BatchReport;
use crate::domain::foundation::{LiveClassId, Timestamp, UserId};
use crate::domain::live_class::LiveClassError;
use crate::ports::{LiveClassRepository, Notifier};

use super::notify_cancellation;

#[derive(Debug, Clone)]
pub struct InstructorUnavailabilityCommand {
    pub instructor_id: UserId,
    pub from: Timestamp,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorUnavailabilityResult {
    pub cancelled: Vec<LiveClassId>,
    pub notifications_sent: usize,
    pub report: BatchReport,
}

/// Cancels every SCHEDULED session of the instructor starting at or after
/// `from` and notifies their participants. Continue-on-error.
pub struct HandleInstructorUnavailabilityHandler {
    live_classes: Arc<dyn LiveClassRepository>,
    notifier: Arc<dyn Notifier>,
}

impl HandleInstructorUnavailabilityHandler {
    pub fn new(live_classes: Arc<dyn LiveClassRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            live_classes,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: InstructorUnavailabilityCommand,
    ) -> Result<InstructorUnavailabilityResult, LiveClassError> {
        let now = Timestamp::now();
        let reason = cmd
            .reason
            .unwrap_or_else(|| "Instructor unavailable".to_string());
        let sessions = self
            .live_classes
            .find_scheduled_from(cmd.instructor_id, cmd.from)
            .await?;

        let mut result = InstructorUnavailabilityResult {
            cancelled: Vec::new(),
            notifications_sent: 0,
            report: BatchReport::default(),
        };

        for mut session in sessions {
            let id = *session.id.as_uuid();
            if let Err(e) = session.cancel(reason.clone(), now) {
                result.report.record_failure(id, e);
                continue;
            }
            if let Err(e) = self.live_classes.update(&session).await {
                tracing::error!(live_class_id = %session.id, error = %e, "Cancellation not saved");
                result.report.record_failure(id, e);
                continue;
            }
            result.report.record_success();
            result.cancelled.push(session.id);
            result.notifications_sent += notify_cancellation(&self.notifier, &session).await;
        }

        tracing::info!(
            instructor_id = %cmd.instructor_id,
            cancelled = result.cancelled.len(),
            notified = result.notifications_sent,
            "Instructor sessions cancelled"
        );
        Ok(result)
    }
}
