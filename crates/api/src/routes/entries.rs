//! Journal entry routes: drafts, posting, and reversal.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerline_core::journal::NewLine;
use ledgerline_db::JournalRepository;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::extractors::Actor;
use super::{forbidden, ledger_error};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/{entry_id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/entries/{entry_id}/lines", post(add_line))
        .route("/entries/{entry_id}/post", post(post_entry))
        .route("/entries/{entry_id}/reverse", post(reverse_entry))
}

/// Request body for creating a draft entry.
///
/// With `lines` present the draft and its lines are created in one
/// transaction, ready to post.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Human-readable description.
    pub description: String,
    /// Optional lines, each addressed by account code.
    #[serde(default)]
    pub lines: Vec<NewLine>,
}

/// Request body for updating a draft's header.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    /// New description, if changing.
    pub description: Option<String>,
    /// New accounting date, if changing.
    pub entry_date: Option<NaiveDate>,
}

/// Request body for reversing a posted entry.
#[derive(Debug, Deserialize)]
pub struct ReverseEntryRequest {
    /// Accounting date of the reversal; on or after the original date.
    pub reversal_date: NaiveDate,
    /// Reason recorded in the reversal's description.
    pub reason: String,
}

fn repo(state: &AppState) -> JournalRepository {
    JournalRepository::new((*state.db).clone())
}

/// POST `/entries` - Create a draft entry, with or without lines.
async fn create_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("create journal entries");
    }

    if payload.lines.is_empty() {
        match repo(&state)
            .create_draft(&ctx, payload.entry_date, &payload.description)
            .await
        {
            Ok(entry) => (StatusCode::CREATED, Json(json!(entry))).into_response(),
            Err(e) => ledger_error(&e),
        }
    } else {
        match repo(&state)
            .create_balanced_entry(&ctx, payload.entry_date, &payload.description, payload.lines)
            .await
        {
            Ok(entry) => (StatusCode::CREATED, Json(json!(entry))).into_response(),
            Err(e) => ledger_error(&e),
        }
    }
}

/// GET `/entries` - List the organization's entries, newest first.
async fn list_entries(State(state): State<AppState>, Actor(ctx): Actor) -> impl IntoResponse {
    match repo(&state)
        .list_entries(ctx.organization_id.into_inner())
        .await
    {
        Ok(entries) => (StatusCode::OK, Json(json!({ "entries": entries }))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// GET `/entries/{entry_id}` - Fetch an entry with its lines.
async fn get_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    match repo(&state)
        .get_entry(ctx.organization_id.into_inner(), entry_id)
        .await
    {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// PATCH `/entries/{entry_id}` - Update a draft's header fields.
async fn update_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<UpdateEntryRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("modify journal entries");
    }

    match repo(&state)
        .update_draft(&ctx, entry_id, payload.description, payload.entry_date)
        .await
    {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// DELETE `/entries/{entry_id}` - Delete a draft. Its number is not reused.
async fn delete_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("delete journal entries");
    }

    match repo(&state).delete_draft(&ctx, entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// POST `/entries/{entry_id}/lines` - Add a line to a draft.
async fn add_line(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<NewLine>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("modify journal entries");
    }

    match repo(&state).add_line(&ctx, entry_id, payload).await {
        Ok(line) => (StatusCode::CREATED, Json(json!(line))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// POST `/entries/{entry_id}/post` - Post a draft, making it immutable.
async fn post_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("post journal entries");
    }

    match repo(&state).post(&ctx, entry_id).await {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// POST `/entries/{entry_id}/reverse` - Reverse a posted entry.
///
/// Responds with the reversal entry, posted and linked to the original.
async fn reverse_entry(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<ReverseEntryRequest>,
) -> impl IntoResponse {
    if !ctx.role.can_post() {
        return forbidden("reverse journal entries");
    }

    match repo(&state)
        .reverse(&ctx, entry_id, payload.reversal_date, &payload.reason)
        .await
    {
        Ok(reversal) => (StatusCode::CREATED, Json(json!(reversal))).into_response(),
        Err(e) => ledger_error(&e),
    }
}
