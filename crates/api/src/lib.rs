//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for accounts, fiscal periods, journal entries, audit
//! - The actor context extractor
//! - Error-to-response mapping

pub mod extractors;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Rejects account deactivation for accounts with lines in an open period.
    pub block_deactivation_in_use: bool,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
