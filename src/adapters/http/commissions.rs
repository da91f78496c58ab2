//! Commission endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::application::handlers::commission::{
    CalculateCommissionCommand, GetCommissionRateQuery, GetCommissionSummaryQuery,
    GetSubscriptionStatusQuery, ProcessPayoutCommand, RecalculateInstitutionCommissionsCommand,
};
use crate::domain::commission::PayoutMethod;
use crate::domain::foundation::{InstitutionId, Money, PaymentId};

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct PayoutRequest {
    pub amount_cents: i64,
    pub method: PayoutMethod,
    pub reference: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/commissions/payments/:payment_id
pub async fn calculate_for_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CalculateCommissionCommand { payment_id };
    let result = state.services.calculate_commission.handle(cmd).await?;
    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result)))
}

/// POST /api/commissions/pending
pub async fn calculate_pending(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.services.pending_commissions.handle().await?;
    Ok(Json(report))
}

/// POST /api/commissions/institutions/:id/recalculate
pub async fn recalculate(
    State(state): State<AppState>,
    Path(institution_id): Path<InstitutionId>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RecalculateInstitutionCommissionsCommand { institution_id };
    let report = state.services.recalculate_commissions.handle(cmd).await?;
    Ok(Json(report))
}

/// POST /api/commissions/institutions/:id/payouts
pub async fn process_payout(
    State(state): State<AppState>,
    Path(institution_id): Path<InstitutionId>,
    Json(request): Json<PayoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ProcessPayoutCommand {
        institution_id,
        amount: Money::from_cents(request.amount_cents),
        method: request.method,
        reference: request.reference,
    };
    let result = state.services.process_payout.handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/commissions/institutions/:id/rate
pub async fn get_rate(
    State(state): State<AppState>,
    Path(institution_id): Path<InstitutionId>,
) -> Result<impl IntoResponse, ApiError> {
    let rate = state
        .services
        .commission_rate
        .handle(GetCommissionRateQuery { institution_id })
        .await?;
    Ok(Json(rate))
}

/// GET /api/commissions/institutions/:id/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(institution_id): Path<InstitutionId>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .commission_summary
        .handle(GetCommissionSummaryQuery { institution_id })
        .await?;
    Ok(Json(summary))
}

/// GET /api/commissions/institutions/:id/subscription
pub async fn get_subscription_status(
    State(state): State<AppState>,
    Path(institution_id): Path<InstitutionId>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .services
        .subscription_status
        .handle(GetSubscriptionStatusQuery { institution_id })
        .await?;
    Ok(Json(status))
}

// ════════════════════════════════════════════════════════════════════════════════
// Routes
// ════════════════════════════════════════════════════════════════════════════════

pub fn commission_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/:payment_id", post(calculate_for_payment))
        .route("/pending", post(calculate_pending))
        .route("/institutions/:id/payouts", post(process_payout))
        .route("/institutions/:id/recalculate", post(recalculate))
        .route("/institutions/:id/rate", get(get_rate))
        .route("/institutions/:id/summary", get(get_summary))
        .route("/institutions/:id/subscription", get(get_subscription_status))
}
