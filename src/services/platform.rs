//! Chat-platform collaborator seen by the core

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::{
    error::PlatformError,
    state::{ChannelId, PanelState, UserId},
};

/// Who a channel permission overwrite applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Everyone,
    User(UserId),
}

/// Outbound effects the bot needs from the chat platform.
///
/// Implementations are shared across the scheduler and request handlers, so every
/// call borrows `self` and returns a boxed future.
pub trait ChatPlatform: Send + Sync {
    /// Post `content` to `channel`
    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), PlatformError>>;

    /// Allow or deny `principal` sending messages in `channel`
    fn set_send_permission<'a>(
        &'a self,
        channel: &'a ChannelId,
        principal: &'a Principal,
        can_send: bool,
    ) -> BoxFuture<'a, Result<(), PlatformError>>;

    /// Create or update the panel message in `channel`
    fn render_panel<'a>(
        &'a self,
        channel: &'a ChannelId,
        panel: &'a PanelState,
    ) -> BoxFuture<'a, Result<(), PlatformError>>;
}
