//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::BotError,
    state::{ChannelId, Reply, Timer},
};

/// Private (ephemeral) reply to the requester of a command or button click
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
    pub ephemeral: bool,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
            follow_up: None,
            timer: None,
            ephemeral: true,
            timestamp: Utc::now(),
        }
    }

    /// Successful reply
    pub fn ok(reply: Reply) -> Self {
        Self {
            follow_up: reply.follow_up,
            timer: reply.timer,
            ..Self::new("ok", reply.message)
        }
    }

    /// Error reply
    pub fn error(message: String) -> Self {
        Self::new("error", message)
    }
}

/// Map a domain error to its HTTP status
pub fn status_for(error: &BotError) -> StatusCode {
    match error {
        BotError::Unauthorized(_) => StatusCode::FORBIDDEN,
        BotError::NotAssigned(_) | BotError::NoPrivateChannel(_) => StatusCode::NOT_FOUND,
        BotError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
        BotError::ChannelUnreachable(_) => StatusCode::BAD_GATEWAY,
        BotError::StateLock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

/// Status response with timer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub active_timers: usize,
    pub panel_channel: Option<ChannelId>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
