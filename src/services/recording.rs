//! In-memory platform that records every effect, with per-channel failure injection

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use futures::future::{self, BoxFuture, FutureExt};

use super::{ChatPlatform, Principal};
use crate::{
    error::PlatformError,
    state::{ChannelId, PanelState},
};

/// One recorded outbound effect
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Message {
        channel: ChannelId,
        content: String,
    },
    Permission {
        channel: ChannelId,
        principal: Principal,
        can_send: bool,
    },
    Panel {
        channel: ChannelId,
        panel: PanelState,
    },
}

#[derive(Debug, Default)]
struct Recorded {
    effects: Vec<Effect>,
    unreachable: HashSet<ChannelId>,
}

/// Platform double for unit and integration tests
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    recorded: Mutex<Recorded>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        // a panicking test thread must not hide effects from the others
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every effect targeting `channel` fail until [`restore`](Self::restore)
    pub fn make_unreachable(&self, channel: &ChannelId) {
        self.recorded().unreachable.insert(channel.clone());
    }

    pub fn restore(&self, channel: &ChannelId) {
        self.recorded().unreachable.remove(channel);
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.recorded().effects.clone()
    }

    /// Messages delivered to `channel`, oldest first
    pub fn messages_to(&self, channel: &ChannelId) -> Vec<String> {
        self.recorded()
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Message { channel: c, content } if c == channel => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_panel(&self) -> Option<PanelState> {
        self.recorded()
            .effects
            .iter()
            .rev()
            .find_map(|effect| match effect {
                Effect::Panel { panel, .. } => Some(panel.clone()),
                _ => None,
            })
    }

    fn record(&self, channel: &ChannelId, effect: Effect) -> Result<(), PlatformError> {
        let mut recorded = self.recorded();
        if recorded.unreachable.contains(channel) {
            return Err(PlatformError::UnknownChannel(channel.to_string()));
        }
        recorded.effects.push(effect);
        Ok(())
    }
}

impl ChatPlatform for RecordingPlatform {
    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        content: &'a str,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        let result = self.record(
            channel,
            Effect::Message {
                channel: channel.clone(),
                content: content.to_string(),
            },
        );
        future::ready(result).boxed()
    }

    fn set_send_permission<'a>(
        &'a self,
        channel: &'a ChannelId,
        principal: &'a Principal,
        can_send: bool,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        let result = self.record(
            channel,
            Effect::Permission {
                channel: channel.clone(),
                principal: principal.clone(),
                can_send,
            },
        );
        future::ready(result).boxed()
    }

    fn render_panel<'a>(
        &'a self,
        channel: &'a ChannelId,
        panel: &'a PanelState,
    ) -> BoxFuture<'a, Result<(), PlatformError>> {
        let result = self.record(
            channel,
            Effect::Panel {
                channel: channel.clone(),
                panel: panel.clone(),
            },
        );
        future::ready(result).boxed()
    }
}
