//! Audit log routes. Read side only; the log is append-only.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::AuditRepository;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::extractors::Actor;
use super::error_response;

/// Creates the audit log routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit", get(list_audit))
}

/// Query filters for the audit log.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Narrow to one table (e.g., "journal_entries").
    pub table_name: Option<String>,
    /// Narrow to one record.
    pub record_id: Option<Uuid>,
}

/// GET `/audit` - List audit records, newest first.
async fn list_audit(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());
    match repo
        .list(
            ctx.organization_id.into_inner(),
            query.table_name.as_deref(),
            query.record_id,
        )
        .await
    {
        Ok(records) => (StatusCode::OK, Json(json!({ "records": records }))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to list audit records");
            error_response(500, "DATABASE_ERROR", "An error occurred")
        }
    }
}
