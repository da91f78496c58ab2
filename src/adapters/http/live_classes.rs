//! Live-class endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::application::handlers::live_class::{
    CancelLiveClassCommand, CompleteLiveClassCommand, InstructorUnavailabilityCommand,
    JoinLiveClassCommand, StartLiveClassCommand,
};
use crate::domain::foundation::{CourseId, InstitutionId, LiveClassId, Timestamp, UserId};
use crate::domain::live_class::{LiveClassProposal, TimeWindow};

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /live-classes` and `POST /live-classes/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveClassRequest {
    pub title: String,
    pub instructor_id: UserId,
    #[serde(default)]
    pub institution_id: Option<InstitutionId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub max_participants: u32,
}

impl From<LiveClassRequest> for LiveClassProposal {
    fn from(request: LiveClassRequest) -> Self {
        LiveClassProposal {
            title: request.title,
            instructor_id: request.instructor_id,
            institution_id: request.institution_id,
            course_id: request.course_id,
            window: TimeWindow::new(request.start_time, request.end_time),
            max_participants: request.max_participants,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelLiveClassRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnavailabilityRequest {
    /// Sessions starting at or after this instant are cancelled. Defaults to now.
    #[serde(default)]
    pub from: Option<Timestamp>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/live-classes/validate
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<LiveClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = LiveClassProposal::from(request);
    let validation = state.services.validate_live_class.handle(&proposal).await?;
    Ok(Json(validation))
}

/// POST /api/live-classes
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<LiveClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.services.create_live_class.handle(request.into()).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/live-classes/:id/start
pub async fn start(
    State(state): State<AppState>,
    Path(live_class_id): Path<LiveClassId>,
) -> Result<impl IntoResponse, ApiError> {
    let live_class = state
        .services
        .start_live_class
        .handle(StartLiveClassCommand { live_class_id })
        .await?;
    Ok(Json(live_class))
}

/// POST /api/live-classes/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(live_class_id): Path<LiveClassId>,
) -> Result<impl IntoResponse, ApiError> {
    let live_class = state
        .services
        .complete_live_class
        .handle(CompleteLiveClassCommand { live_class_id })
        .await?;
    Ok(Json(live_class))
}

/// POST /api/live-classes/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path(live_class_id): Path<LiveClassId>,
    Json(request): Json<CancelLiveClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CancelLiveClassCommand {
        live_class_id,
        reason: request.reason,
    };
    let live_class = state.services.cancel_live_class.handle(cmd).await?;
    Ok(Json(live_class))
}

/// POST /api/live-classes/:id/join
pub async fn join(
    State(state): State<AppState>,
    Path(live_class_id): Path<LiveClassId>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = JoinLiveClassCommand {
        user_id: user.user_id,
        live_class_id,
    };
    let result = state.services.join_live_class.handle(cmd).await?;
    Ok(Json(result))
}

/// POST /api/live-classes/instructors/:id/unavailability
pub async fn instructor_unavailable(
    State(state): State<AppState>,
    Path(instructor_id): Path<UserId>,
    request: Option<Json<UnavailabilityRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let cmd = InstructorUnavailabilityCommand {
        instructor_id,
        from: request.from.unwrap_or_else(Timestamp::now),
        reason: request.reason,
    };
    let result = state.services.instructor_unavailability.handle(cmd).await?;
    Ok(Json(result))
}

// ════════════════════════════════════════════════════════════════════════════════
// Routes
// ════════════════════════════════════════════════════════════════════════════════

pub fn live_class_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/validate", post(validate))
        .route("/:id/start", post(start))
        .route("/:id/complete", post(complete))
        .route("/:id/cancel", post(cancel))
        .route("/:id/join", post(join))
        .route(
            "/instructors/:id/unavailability",
            post(instructor_unavailable),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_becomes_proposal_window() {
        let start = Timestamp::now().add_hours(2);
        let request = LiveClassRequest {
            title: "Pronunciation lab".to_string(),
            instructor_id: UserId::new(),
            institution_id: None,
            course_id: None,
            start_time: start,
            end_time: start.add_hours(1),
            max_participants: 12,
        };
        let proposal = LiveClassProposal::from(request);
        assert_eq!(proposal.window.duration_minutes(), 60);
        assert_eq!(proposal.max_participants, 12);
    }
}
