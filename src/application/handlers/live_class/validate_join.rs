//! ValidateJoinHandler - Whether a user may join a live class now.

use std::sync::Arc;

use crate::application::handlers::quota::QuotaTracker;
use crate::domain::foundation::{LiveClassId, UserId};
use crate::domain::live_class::{LiveClass, LiveClassError};
use crate::ports::LiveClassRepository;

#[derive(Debug, Clone)]
pub struct ValidateJoinQuery {
    pub user_id: UserId,
    pub live_class_id: LiveClassId,
}

/// Checks, in order: subscription eligibility, session ACTIVE, room under
/// the cap, user not already joined.
pub struct ValidateJoinHandler {
    live_classes: Arc<dyn LiveClassRepository>,
    quota: Arc<QuotaTracker>,
}

impl ValidateJoinHandler {
    pub fn new(live_classes: Arc<dyn LiveClassRepository>, quota: Arc<QuotaTracker>) -> Self {
        Self { live_classes, quota }
    }

    /// Returns the session when the user may join.
    pub async fn handle(&self, query: ValidateJoinQuery) -> Result<LiveClass, LiveClassError> {
        let live_class = self
            .live_classes
            .find_by_id(query.live_class_id)
            .await?
            .ok_or(LiveClassError::NotFound(query.live_class_id))?;

        let admission = self.quota.can_join_live_class(query.user_id).await?;
        if !admission.allowed {
            return Err(LiveClassError::JoinNotAllowed {
                user: query.user_id,
                reason: admission
                    .reason
                    .unwrap_or_else(|| "Not eligible".to_string()),
            });
        }

        live_class.check_joinable(query.user_id)?;
        Ok(live_class)
    }
}
