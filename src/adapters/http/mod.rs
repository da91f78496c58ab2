//! HTTP adapter - REST API over the governance services.
//!
//! Every endpoint is a thin pass-through to a handler in
//! [`GovernanceServices`]; area errors become JSON [`ErrorResponse`] bodies.
//!
//! - `/api/subscriptions/:subject_kind/:id/...` - lifecycle and grace period
//! - `/api/commissions/...` - commission calculation, rates and payouts
//! - `/api/live-classes/...` - scheduling, joining and cancellation
//! - `/api/platform-courses/:course_id/...` - access, enrollment
//! - `/api/usage/...`, `/api/reports/...` - dashboards and reports

pub mod commissions;
pub mod error;
pub mod extract;
pub mod live_classes;
pub mod platform_courses;
pub mod subscriptions;
pub mod usage;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::application::GovernanceServices;

pub use error::{ApiError, ErrorResponse};
pub use extract::{AuthenticatedUser, USER_ID_HEADER};

/// Shared application state. Cloned per request; every handler is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: GovernanceServices,
}

impl AppState {
    pub fn new(services: GovernanceServices) -> Self {
        Self { services }
    }
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/subscriptions", subscriptions::subscription_routes())
        .nest("/commissions", commissions::commission_routes())
        .nest("/live-classes", live_classes::live_class_routes())
        .nest("/platform-courses", platform_courses::platform_course_routes())
        .nest("/usage", usage::usage_routes())
        .nest("/reports", usage::report_routes())
}

/// The complete application router: `/health` plus the API under `/api`.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
