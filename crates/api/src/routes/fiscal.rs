//! Fiscal period management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerline_db::FiscalRepository;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::extractors::Actor;
use super::{fiscal_error, forbidden};

/// Creates the fiscal period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-periods", get(list_periods).post(create_period))
        .route("/fiscal-periods/locked", get(check_locked))
        .route("/fiscal-periods/{period_id}/close", post(close_period))
        .route("/fiscal-periods/{period_id}/lock", post(lock_period))
        .route("/fiscal-periods/{period_id}/reopen", post(reopen_period))
}

/// Request body for creating a fiscal period.
#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    /// Period name (e.g., "2026-01").
    pub name: String,
    /// First postable date (inclusive).
    pub start_date: NaiveDate,
    /// Last postable date (inclusive).
    pub end_date: NaiveDate,
}

/// Query for the lock check.
#[derive(Debug, Deserialize)]
pub struct LockedQuery {
    /// Date to check (YYYY-MM-DD).
    pub date: NaiveDate,
}

/// POST `/fiscal-periods` - Create a period.
async fn create_period(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(payload): Json<CreatePeriodRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_periods() {
        return forbidden("create fiscal periods");
    }

    let repo = FiscalRepository::new((*state.db).clone());
    match repo
        .create_period(&ctx, &payload.name, payload.start_date, payload.end_date)
        .await
    {
        Ok(period) => (StatusCode::CREATED, Json(json!(period))).into_response(),
        Err(e) => fiscal_error(&e),
    }
}

/// GET `/fiscal-periods` - List the organization's periods.
async fn list_periods(State(state): State<AppState>, Actor(ctx): Actor) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    match repo.list_periods(ctx.organization_id.into_inner()).await {
        Ok(periods) => (StatusCode::OK, Json(json!({ "periods": periods }))).into_response(),
        Err(e) => fiscal_error(&e),
    }
}

/// GET `/fiscal-periods/locked?date=YYYY-MM-DD` - Lock check for a date.
///
/// Fail-closed: a date covered by no period reports locked.
async fn check_locked(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<LockedQuery>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    match repo
        .is_locked(ctx.organization_id.into_inner(), query.date)
        .await
    {
        Ok(locked) => (
            StatusCode::OK,
            Json(json!({ "date": query.date, "locked": locked })),
        )
            .into_response(),
        Err(e) => fiscal_error(&e),
    }
}

/// POST `/fiscal-periods/{period_id}/close` - Close an open period.
async fn close_period(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_periods() {
        return forbidden("close fiscal periods");
    }

    let repo = FiscalRepository::new((*state.db).clone());
    match repo.close(&ctx, period_id).await {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => fiscal_error(&e),
    }
}

/// POST `/fiscal-periods/{period_id}/lock` - Lock a closed period. Terminal.
async fn lock_period(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_periods() {
        return forbidden("lock fiscal periods");
    }

    let repo = FiscalRepository::new((*state.db).clone());
    match repo.lock(&ctx, period_id).await {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => fiscal_error(&e),
    }
}

/// POST `/fiscal-periods/{period_id}/reopen` - Reopen a closed period.
///
/// The role check happens in the repository so denied attempts are audited;
/// no pre-check here.
async fn reopen_period(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    match repo.reopen(&ctx, period_id).await {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => fiscal_error(&e),
    }
}
