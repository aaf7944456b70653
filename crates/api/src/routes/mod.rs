//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerline_core::accounts::AccountError;
use ledgerline_core::fiscal::FiscalError;
use ledgerline_core::journal::LedgerError;
use ledgerline_shared::AppError;
use serde_json::json;
use tracing::error;

use crate::AppState;

pub mod accounts;
pub mod audit;
pub mod entries;
pub mod fiscal;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(fiscal::routes())
        .merge(entries::routes())
        .merge(audit::routes())
}

pub(crate) fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}

pub(crate) fn forbidden(action: &str) -> Response {
    let err = AppError::Forbidden(format!("Your role is not permitted to {action}"));
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

pub(crate) fn ledger_error(err: &LedgerError) -> Response {
    if matches!(err, LedgerError::Database(_) | LedgerError::Internal(_)) {
        error!(error = %err, "journal operation failed");
    }
    error_response(err.http_status_code(), err.error_code(), &err.to_string())
}

pub(crate) fn account_error(err: &AccountError) -> Response {
    if matches!(err, AccountError::Database(_)) {
        error!(error = %err, "account operation failed");
    }
    error_response(err.http_status_code(), err.error_code(), &err.to_string())
}

pub(crate) fn fiscal_error(err: &FiscalError) -> Response {
    if matches!(err, FiscalError::Database(_)) {
        error!(error = %err, "fiscal operation failed");
    }
    error_response(err.http_status_code(), err.error_code(), &err.to_string())
}
