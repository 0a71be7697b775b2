//! HTTP route definitions

use crate::api::handlers;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    Router::new()
        // Browser-facing routes
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        // API routes
        .route("/api/connection", get(handlers::api_connection))
        .route("/api/connection/stats", get(handlers::api_connection_stats))
        .route("/api/chat", post(handlers::api_chat))
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        // 404 page for anything else
        .fallback(handlers::not_found)
        // Add shared state
        .with_state(state)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}
