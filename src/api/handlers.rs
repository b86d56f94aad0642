//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};
use crate::{
    error::BotError,
    events::{ButtonAction, Command, TimerAction},
    state::{AppState, PanelState, Timer, UserId},
};

/// Button click forwarded by the platform gateway
#[derive(Debug, Deserialize)]
pub struct ButtonRequest {
    pub user_id: UserId,
    pub custom_id: String,
}

/// Body of the direct start/complete endpoints
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub requester: UserId,
}

/// Handle POST /commands - Run an admin slash command
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<Json<ApiResponse>, BotError> {
    info!(?command, "Command received");
    let reply = state.handle_command(command, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(reply)))
}

/// Handle POST /interactions/button - Decode a panel button and act on it
pub async fn button_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ButtonRequest>,
) -> Response {
    let button: ButtonAction = match request.custom_id.parse() {
        Ok(button) => button,
        Err(e) => {
            warn!(user = %request.user_id, "Rejected button interaction: {}", e);
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
                .into_response();
        }
    };

    match state.handle_button(request.user_id, button, Utc::now()).await {
        Ok(reply) => Json(ApiResponse::ok(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Handle POST /timers/:owner_id/start - Start or restart the owner's timer
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<ApiResponse>, BotError> {
    let action = TimerAction::Start {
        requester: request.requester,
        owner: UserId::new(owner_id),
    };
    let reply = state.handle_action(action, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(reply)))
}

/// Handle POST /timers/:owner_id/complete - Mark the owner's work as complete
pub async fn complete_handler(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<ApiResponse>, BotError> {
    let action = TimerAction::Complete {
        requester: request.requester,
        owner: UserId::new(owner_id),
    };
    let reply = state.handle_action(action, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(reply)))
}

/// Handle GET /panel - Current derived panel state
pub async fn panel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PanelState>, BotError> {
    Ok(Json(state.panel_state(Utc::now())?))
}

/// Handle GET /timers - All active timers
pub async fn timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Timer>>, BotError> {
    Ok(Json(state.store.all()?))
}

/// Handle GET /status - Return current service status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, BotError> {
    let (last_action, last_action_time) = match state.last_action() {
        Some((action, time)) => (Some(action), Some(time)),
        None => (None, None),
    };

    Ok(Json(StatusResponse {
        active_timers: state.store.len()?,
        panel_channel: state.panel_channel(),
        uptime: state.uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
