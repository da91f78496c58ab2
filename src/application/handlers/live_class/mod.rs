//! Live-class governance handlers.

mod cancel_live_class;
mod complete_live_class;
mod create_live_class;
mod handle_instructor_unavailability;
mod join_live_class;
mod start_live_class;
mod validate_creation;
mod validate_join;

pub use cancel_live_class::{CancelLiveClassCommand, CancelLiveClassHandler};
pub use complete_live_class::{CompleteLiveClassCommand, CompleteLiveClassHandler};
pub use create_live_class::{CreateLiveClassHandler, CreateLiveClassResult};
pub use handle_instructor_unavailability::{
    HandleInstructorUnavailabilityHandler, InstructorUnavailabilityCommand,
    InstructorUnavailabilityResult,
};
pub use join_live_class::{JoinLiveClassCommand, JoinLiveClassHandler, JoinLiveClassResult};
pub use start_live_class::{StartLiveClassCommand, StartLiveClassHandler};
pub use validate_creation::{LiveClassValidation, ValidateLiveClassCreationHandler};
pub use validate_join::{ValidateJoinHandler, ValidateJoinQuery};

use std::sync::Arc;

use crate::domain::live_class::LiveClass;
use crate::ports::{Notification, Notifier};

/// Tell every participant that `live_class` was cancelled.
///
/// Delivery failures are logged and skipped. Returns the number sent.
pub(crate) async fn notify_cancellation(notifier: &Arc<dyn Notifier>, live_class: &LiveClass) -> usize {
    let reason = live_class
        .cancellation_reason
        .clone()
        .unwrap_or_else(|| "Cancelled".to_string());
    let mut sent = 0;
    for &user_id in &live_class.participants {
        let notification = Notification::LiveClassCancelled {
            user_id,
            live_class_id: live_class.id,
            reason: reason.clone(),
        };
        match notifier.notify(notification).await {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(
                live_class_id = %live_class.id,
                user_id = %user_id,
                error = %e,
                "Cancellation notice not delivered"
            ),
        }
    }
    sent
}
