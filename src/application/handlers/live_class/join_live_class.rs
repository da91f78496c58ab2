//! JoinLiveClassHandler - Adds a participant and counts the attendance.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::quota::QuotaTracker;
use crate::domain::foundation::{LiveClassId, Timestamp, UserId};
use crate::domain::live_class::{LiveClass, LiveClassError};
use crate::domain::subscription::{Subject, UsageCounters};
use crate::ports::{LiveClassRepository, SubscriptionRepository};

use super::{ValidateJoinHandler, ValidateJoinQuery};

#[derive(Debug, Clone)]
pub struct JoinLiveClassCommand {
    pub user_id: UserId,
    pub live_class_id: LiveClassId,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinLiveClassResult {
    pub live_class: LiveClass,
    pub usage: UsageCounters,
}

pub struct JoinLiveClassHandler {
    validator: Arc<ValidateJoinHandler>,
    live_classes: Arc<dyn LiveClassRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    quota: Arc<QuotaTracker>,
}

impl JoinLiveClassHandler {
    pub fn new(
        validator: Arc<ValidateJoinHandler>,
        live_classes: Arc<dyn LiveClassRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        Self {
            validator,
            live_classes,
            subscriptions,
            quota,
        }
    }

    pub async fn handle(&self, cmd: JoinLiveClassCommand) -> Result<JoinLiveClassResult, LiveClassError> {
        self.validator
            .handle(ValidateJoinQuery {
                user_id: cmd.user_id,
                live_class_id: cmd.live_class_id,
            })
            .await?;

        let subscription = self
            .subscriptions
            .find_current(Subject::Student(cmd.user_id))
            .await?
            .ok_or_else(|| LiveClassError::JoinNotAllowed {
                user: cmd.user_id,
                reason: "No subscription found".to_string(),
            })?;

        // The seat is taken in one conditional write; a concurrent join may
        // have filled the room since validation.
        let live_class = match self
            .live_classes
            .add_participant(cmd.live_class_id, cmd.user_id, Timestamp::now())
            .await?
        {
            Some(live_class) => live_class,
            None => return Err(self.refusal(cmd.live_class_id, cmd.user_id).await),
        };

        let usage = match self.quota.track_attendance_usage(subscription.id).await {
            Ok(usage) => usage,
            Err(e) => {
                if let Err(release) = self
                    .live_classes
                    .remove_participant(cmd.live_class_id, cmd.user_id, Timestamp::now())
                    .await
                {
                    tracing::warn!(
                        live_class_id = %cmd.live_class_id,
                        user_id = %cmd.user_id,
                        error = %release,
                        "Failed to release live class seat after refused attendance"
                    );
                }
                return Err(LiveClassError::JoinNotAllowed {
                    user: cmd.user_id,
                    reason: e.message,
                });
            }
        };

        tracing::info!(
            live_class_id = %live_class.id,
            user_id = %cmd.user_id,
            participants = live_class.participants.len(),
            "User joined live class"
        );

        Ok(JoinLiveClassResult { live_class, usage })
    }

    /// Why a conditional add was refused, read back from the stored session.
    async fn refusal(&self, id: LiveClassId, user: UserId) -> LiveClassError {
        match self.live_classes.find_by_id(id).await {
            Ok(Some(live_class)) => match live_class.check_joinable(user) {
                Err(e) => e,
                Ok(()) => LiveClassError::ClassFull {
                    max: live_class.max_participants,
                },
            },
            Ok(None) => LiveClassError::NotFound(id),
            Err(e) => e.into(),
        }
    }
}
