//! Usage dashboards and platform reports.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::application::handlers::analytics::{CommissionReportQuery, UsageDashboardQuery};
use crate::domain::foundation::{Timestamp, UserId};

use super::error::ApiError;
use super::AppState;

const DEFAULT_REPORT_DAYS: i64 = 30;

/// Query string of `GET /reports/commissions`.
///
/// Either an explicit `from`/`to` window or a trailing `days` count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub days: Option<i64>,
}

impl ReportParams {
    fn into_query(self) -> CommissionReportQuery {
        let trailing = CommissionReportQuery::trailing_days(self.days.unwrap_or(DEFAULT_REPORT_DAYS));
        match (self.from, self.to) {
            (Some(from), Some(to)) => CommissionReportQuery { from, to },
            (Some(from), None) => CommissionReportQuery { from, to: trailing.to },
            (None, Some(to)) => CommissionReportQuery {
                from: to.minus_days(self.days.unwrap_or(DEFAULT_REPORT_DAYS)),
                to,
            },
            (None, None) => trailing,
        }
    }
}

/// GET /api/usage/:user_id/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = state
        .services
        .usage_dashboard
        .handle(UsageDashboardQuery { user_id })
        .await?;
    Ok(Json(dashboard))
}

/// GET /api/usage/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let alerts = state.services.usage_alerts.handle().await?;
    Ok(Json(alerts))
}

/// GET /api/reports/commissions
pub async fn get_commission_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .services
        .commission_report
        .handle(params.into_query())
        .await?;
    Ok(Json(report))
}

pub fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(get_alerts))
        .route("/:user_id/dashboard", get(get_dashboard))
}

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/commissions", get(get_commission_report))
}
