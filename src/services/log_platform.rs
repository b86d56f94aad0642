//! Dry-run platform that only logs outbound effects

use futures::future::{self, BoxFuture, FutureExt};
use tracing::info;

use super::{ChatPlatform, Principal};
use crate::{
    error::PlatformError,
    state::{ChannelId, PanelState},
};

/// Used when no gateway is configured
#[derive(Debug, Default, Clone)]
pub struct LogPlatform;

impl LogPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl ChatPlatform for LogPlatform {
    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        info!(channel = %channel, "[dry-run] send message: {}", content);
        future::ready(Ok(())).boxed()
    }

    fn set_send_permission<'a>(
        &'a self,
        channel: &'a ChannelId,
        principal: &'a Principal,
        can_send: bool,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        info!(channel = %channel, ?principal, can_send, "[dry-run] set send permission");
        future::ready(Ok(())).boxed()
    }

    fn render_panel<'a>(
        &'a self,
        channel: &'a ChannelId,
        panel: &'a PanelState,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        info!(
            channel = %channel,
            timers = panel.entries.len(),
            buttons_enabled = panel.buttons_enabled,
            "[dry-run] render panel"
        );
        future::ready(Ok(())).boxed()
    }
}
