//! Platform-course endpoints. The caller is the student named by `X-User-Id`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::application::handlers::platform_course::{
    CancelEnrollmentCommand, CheckCourseAccessQuery, EnrollInCourseCommand,
};
use crate::domain::foundation::CourseId;

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;

/// GET /api/platform-courses/:course_id/access
pub async fn check_access(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let query = CheckCourseAccessQuery {
        user_id: user.user_id,
        course_id,
    };
    let access = state.services.course_access.handle(query).await?;
    Ok(Json(access))
}

/// POST /api/platform-courses/:course_id/enroll
pub async fn enroll(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = EnrollInCourseCommand {
        user_id: user.user_id,
        course_id,
    };
    let result = state.services.enroll.handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/platform-courses/:course_id/cancel
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CancelEnrollmentCommand {
        user_id: user.user_id,
        course_id,
    };
    let enrollment = state.services.cancel_enrollment.handle(cmd).await?;
    Ok(Json(enrollment))
}

pub fn platform_course_routes() -> Router<AppState> {
    Router::new()
        .route("/:course_id/access", get(check_access))
        .route("/:course_id/enroll", post(enroll))
        .route("/:course_id/cancel", post(cancel_enrollment))
}
