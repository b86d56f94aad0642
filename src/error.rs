//! Error types shared by the timer store, the event handlers and the platform layer

use thiserror::Error;

use crate::state::UserId;

/// Errors surfaced to whoever triggered an action
#[derive(Debug, Error)]
pub enum BotError {
    /// Non-admin ran an admin command, or a non-owner touched someone else's timer
    #[error("{0}")]
    Unauthorized(String),

    /// Start/complete for an owner without a timer (and, for start, without retained settings)
    #[error("You have not been assigned a timer yet. Please ask an administrator to assign you a timer.")]
    NotAssigned(UserId),

    /// Retained settings exist but the owner's private channel binding is gone
    #[error("No private channel found for you. Please ask an administrator to reassign your timer.")]
    NoPrivateChannel(UserId),

    /// Assign with a non-positive (or negative component) duration
    #[error("Invalid timer duration: {0}")]
    InvalidDuration(String),

    /// The chat platform could not reach a channel the caller asked for directly
    /// (panel creation). Notices and reminders log platform failures instead.
    #[error("Channel unreachable: {0}")]
    ChannelUnreachable(#[from] PlatformError),

    /// The store mutex was poisoned by a panicking writer
    #[error("Failed to lock timer store: {0}")]
    StateLock(String),
}

/// Failures reported by a [`ChatPlatform`](crate::services::ChatPlatform) implementation
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The HTTP request to the gateway could not be sent or completed
    #[error("gateway request failed: {0}")]
    Request(String),

    /// The gateway answered with a non-success status
    #[error("gateway returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The target channel does not exist or the bot cannot see it
    #[error("channel {0} not found")]
    UnknownChannel(String),
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.to_string())
    }
}

pub type BotResult<T> = Result<T, BotError>;
