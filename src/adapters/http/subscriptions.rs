//! Subscription lifecycle endpoints.
//!
//! All routes are keyed by the subscription holder:
//! `/subscriptions/:subject_kind/:id` where `subject_kind` is `student` or
//! `institution`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, DowngradeSubscriptionCommand, GetGracePeriodQuery,
    HandleTrialExpirationCommand, ReactivateSubscriptionCommand, UpgradeSubscriptionCommand,
};
use crate::domain::foundation::{Timestamp, TierId};
use crate::domain::subscription::{Subject, SubjectKind};

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeRequest {
    pub new_tier_id: TierId,
    #[serde(default = "default_immediate")]
    pub immediate: bool,
}

fn default_immediate() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DowngradeRequest {
    pub new_tier_id: TierId,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub effective_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

fn subject(kind: &str, id: Uuid) -> Result<Subject, ApiError> {
    Ok(Subject::from_parts(SubjectKind::parse(kind)?, id))
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions/:subject_kind/:id/grace-period
pub async fn get_grace_period(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetGracePeriodQuery {
        subject: subject(&kind, id)?,
    };
    let grace = state.services.grace_period.handle(query).await?;
    Ok(Json(grace))
}

/// POST /api/subscriptions/:subject_kind/:id/upgrade
pub async fn upgrade(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    user: AuthenticatedUser,
    Json(request): Json<UpgradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = UpgradeSubscriptionCommand {
        subject: subject(&kind, id)?,
        new_tier_id: request.new_tier_id,
        immediate: request.immediate,
        actor_id: Some(user.user_id),
    };
    let result = state.services.upgrade_subscription.handle(cmd).await?;
    Ok(Json(result))
}

/// POST /api/subscriptions/:subject_kind/:id/downgrade
pub async fn downgrade(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    user: AuthenticatedUser,
    Json(request): Json<DowngradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DowngradeSubscriptionCommand {
        subject: subject(&kind, id)?,
        new_tier_id: request.new_tier_id,
        reason: request.reason,
        effective_date: request.effective_date,
        actor_id: Some(user.user_id),
    };
    let result = state.services.downgrade_subscription.handle(cmd).await?;
    Ok(Json(result))
}

/// POST /api/subscriptions/:subject_kind/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    user: AuthenticatedUser,
    request: Option<Json<CancelRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let cmd = CancelSubscriptionCommand {
        subject: subject(&kind, id)?,
        reason: request.reason,
        actor_id: Some(user.user_id),
    };
    let result = state.services.cancel_subscription.handle(cmd).await?;
    Ok(Json(result))
}

/// POST /api/subscriptions/:subject_kind/:id/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ReactivateSubscriptionCommand {
        subject: subject(&kind, id)?,
        actor_id: Some(user.user_id),
    };
    let result = state.services.reactivate_subscription.handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/subscriptions/:subject_kind/:id/trial-expiration
pub async fn expire_trial(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = HandleTrialExpirationCommand {
        subject: subject(&kind, id)?,
    };
    let result = state.services.trial_expiration.handle(cmd).await?;
    Ok(Json(result))
}

// ════════════════════════════════════════════════════════════════════════════════
// Routes
// ════════════════════════════════════════════════════════════════════════════════

pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/:subject_kind/:id/grace-period", get(get_grace_period))
        .route("/:subject_kind/:id/upgrade", post(upgrade))
        .route("/:subject_kind/:id/downgrade", post(downgrade))
        .route("/:subject_kind/:id/cancel", post(cancel))
        .route("/:subject_kind/:id/reactivate", post(reactivate))
        .route("/:subject_kind/:id/trial-expiration", post(expire_trial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_parses_kind() {
        let id = Uuid::new_v4();
        assert_eq!(
            subject("institution", id).ok(),
            Some(Subject::from_parts(SubjectKind::Institution, id))
        );
        assert!(subject("tutor", id).is_err());
    }

    #[test]
    fn upgrade_defaults_to_immediate() {
        let request: UpgradeRequest =
            serde_json::from_str(&format!(r#"{{"new_tier_id":"{}"}}"#, TierId::new())).unwrap();
        assert!(request.immediate);
    }
}
