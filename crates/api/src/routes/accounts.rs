//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use ledgerline_core::accounts::AccountType;
use ledgerline_db::AccountRepository;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::extractors::Actor;
use super::{account_error, forbidden};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/ensure", post(ensure_account))
        .route(
            "/accounts/{code}",
            get(get_account).delete(deactivate_account),
        )
}

/// Request body for creating or ensuring an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account code, unique within the organization (e.g., "1000").
    pub code: String,
    /// Human-readable name (e.g., "Cash").
    pub name: String,
    /// One of: asset, liability, equity, revenue, expense.
    pub account_type: AccountType,
}

fn repo(state: &AppState) -> AccountRepository {
    AccountRepository::new((*state.db).clone(), state.block_deactivation_in_use)
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_accounts() {
        return forbidden("create accounts");
    }

    match repo(&state)
        .create(&ctx, &payload.code, &payload.name, payload.account_type)
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(json!(account))).into_response(),
        Err(e) => account_error(&e),
    }
}

/// POST `/accounts/ensure` - Create the account if absent.
///
/// Responds 201 when this call created it, 200 when it already existed;
/// the body's `outcome` field says which.
async fn ensure_account(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_accounts() {
        return forbidden("create accounts");
    }

    match repo(&state)
        .ensure(&ctx, &payload.code, &payload.name, payload.account_type)
        .await
    {
        Ok(outcome) => {
            let status = if outcome.was_created() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(json!(outcome))).into_response()
        }
        Err(e) => account_error(&e),
    }
}

/// GET `/accounts` - List the organization's accounts.
async fn list_accounts(State(state): State<AppState>, Actor(ctx): Actor) -> impl IntoResponse {
    match repo(&state).list(ctx.organization_id.into_inner()).await {
        Ok(accounts) => (StatusCode::OK, Json(json!({ "accounts": accounts }))).into_response(),
        Err(e) => account_error(&e),
    }
}

/// GET `/accounts/{code}` - Resolve a code to an active account.
async fn get_account(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match repo(&state)
        .resolve(ctx.organization_id.into_inner(), &code)
        .await
    {
        Ok(account) => (StatusCode::OK, Json(json!(account))).into_response(),
        Err(e) => account_error(&e),
    }
}

/// DELETE `/accounts/{code}` - Deactivate an account.
///
/// The account stops accepting new lines; existing lines keep referencing it.
async fn deactivate_account(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(code): Path<String>,
) -> impl IntoResponse {
    if !ctx.role.can_manage_accounts() {
        return forbidden("deactivate accounts");
    }

    match repo(&state).deactivate(&ctx, &code).await {
        Ok(account) => (StatusCode::OK, Json(json!(account))).into_response(),
        Err(e) => account_error(&e),
    }
}
