//! HTTP API module
//!
//! The platform gateway posts slash commands and button clicks here; read-only
//! endpoints expose the timers and the derived panel.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/commands", post(command_handler))
        .route("/interactions/button", post(button_handler))
        .route("/timers", get(timers_handler))
        .route("/timers/:owner_id/start", post(start_handler))
        .route("/timers/:owner_id/complete", post(complete_handler))
        .route("/panel", get(panel_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
