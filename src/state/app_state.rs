//! Main application state: the timer store plus the glue that turns inbound
//! events into store mutations and platform effects

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::{validate_duration, ChannelId, PanelState, Timer, TimerStore, UserId};
use crate::{
    error::{BotError, BotResult},
    events::{ButtonAction, ButtonScope, Command, TimerAction},
    services::{ChatPlatform, Principal},
    state::panel::format_time_left,
};

const START_INSTRUCTIONS: &str = "Complete your work within the allocated time and click the \
    \"Complete Work\" button when finished.";

const COMPLETE_NEXT_STEPS: &str = "1️⃣ Attach your completed work in this chat\n\
    2️⃣ Upload the work to Trello\n\
    3️⃣ Move the Trello card to the appropriate list";

/// Private reply returned to whoever triggered an event
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
}

impl Reply {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            follow_up: None,
            timer: None,
        }
    }

    fn with_timer(mut self, timer: Timer) -> Self {
        self.timer = Some(timer);
        self
    }
}

/// Shared state handed to the API handlers and background tasks
pub struct AppState {
    pub store: TimerStore,
    pub platform: Arc<dyn ChatPlatform>,
    admins: HashSet<UserId>,
    panel_channel: Mutex<Option<ChannelId>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        admins: impl IntoIterator<Item = UserId>,
        host: String,
        port: u16,
    ) -> Self {
        Self {
            store: TimerStore::new(),
            platform,
            admins: admins.into_iter().collect(),
            panel_channel: Mutex::new(None),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    pub fn is_admin(&self, user: &UserId) -> bool {
        self.admins.contains(user)
    }

    fn require_admin(&self, requester: &UserId) -> BotResult<()> {
        if self.is_admin(requester) {
            Ok(())
        } else {
            warn!(requester = %requester, "Admin command rejected");
            Err(BotError::Unauthorized(
                "You need administrator permissions to use this command.".to_string(),
            ))
        }
    }

    fn require_owner(requester: &UserId, owner: &UserId) -> BotResult<()> {
        if requester == owner {
            Ok(())
        } else {
            warn!(requester = %requester, owner = %owner, "Timer action by non-owner rejected");
            Err(BotError::Unauthorized(
                "You can only manage your own timer.".to_string(),
            ))
        }
    }

    fn record_action(&self, action: &str, now: DateTime<Utc>) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), now));
        }
    }

    /// Get last action information
    pub fn last_action(&self) -> Option<(String, DateTime<Utc>)> {
        self.last_action.lock().ok().and_then(|a| a.clone())
    }

    pub fn panel_channel(&self) -> Option<ChannelId> {
        self.panel_channel.lock().ok().and_then(|c| c.clone())
    }

    /// Dispatch an admin command
    pub async fn handle_command(&self, command: Command, now: DateTime<Utc>) -> BotResult<Reply> {
        match command {
            Command::Panel { requester, channel } => {
                self.create_panel(&requester, channel, now).await
            }
            Command::Assign {
                requester,
                freelancer,
                hours,
                minutes,
                private_channel,
            } => {
                self.assign(&requester, &freelancer, hours, minutes, private_channel, now)
                    .await
            }
        }
    }

    /// Dispatch a panel button click
    pub async fn handle_button(
        &self,
        user: UserId,
        button: ButtonAction,
        now: DateTime<Utc>,
    ) -> BotResult<Reply> {
        info!(user = %user, button = %button, "Button interaction");
        if button.scope == ButtonScope::Unassigned {
            return Err(BotError::NotAssigned(user));
        }
        self.handle_action(TimerAction::from_button(button.kind, user), now)
            .await
    }

    /// Dispatch an owner timer action
    pub async fn handle_action(&self, action: TimerAction, now: DateTime<Utc>) -> BotResult<Reply> {
        match action {
            TimerAction::Start { requester, owner } => self.start(&requester, &owner, now).await,
            TimerAction::Complete { requester, owner } => {
                self.complete(&requester, &owner, now).await
            }
        }
    }

    /// Silence everyone in `channel`, render the panel there and bind it.
    ///
    /// The binding only changes once the first render succeeds; an unreachable
    /// channel leaves any previous panel in place.
    pub async fn create_panel(
        &self,
        requester: &UserId,
        channel: ChannelId,
        now: DateTime<Utc>,
    ) -> BotResult<Reply> {
        self.require_admin(requester)?;

        if let Err(e) = self
            .platform
            .set_send_permission(&channel, &Principal::Everyone, false)
            .await
        {
            warn!(channel = %channel, "Failed to lock panel channel: {}", e);
        }

        let panel = self.panel_state(now)?;
        self.platform.render_panel(&channel, &panel).await?;

        {
            let mut panel_channel = self
                .panel_channel
                .lock()
                .map_err(|e| BotError::StateLock(e.to_string()))?;
            *panel_channel = Some(channel.clone());
        }
        info!(channel = %channel, "Panel bound");
        self.record_action("panel", now);

        Ok(Reply::new(format!("Work Timer Panel created in <#{}>!", channel)))
    }

    /// Assign a timer, replacing any timer the freelancer already had
    pub async fn assign(
        &self,
        requester: &UserId,
        freelancer: &UserId,
        hours: f64,
        minutes: f64,
        private_channel: ChannelId,
        now: DateTime<Utc>,
    ) -> BotResult<Reply> {
        self.require_admin(requester)?;
        let settings = validate_duration(hours, minutes, now)?;

        if self.store.get(freelancer)?.is_some() {
            info!(owner = %freelancer, "Reassigning over an active timer");
        }
        let timer = self
            .store
            .assign(freelancer, settings, private_channel.clone(), now)?;
        self.record_action("assign", now);

        let mut reply = Reply::new(format!(
            "Timer assigned to {} for {}. Private channel: <#{}>",
            freelancer.mention(),
            settings.describe(),
            private_channel
        ))
        .with_timer(timer);

        match self.panel_channel() {
            Some(panel_channel) => {
                let principal = Principal::User(freelancer.clone());
                if let Err(e) = self
                    .platform
                    .set_send_permission(&panel_channel, &principal, false)
                    .await
                {
                    warn!(owner = %freelancer, "Failed to silence freelancer in panel channel: {}", e);
                }
                self.refresh_panel(now).await;
            }
            None => {
                reply.follow_up = Some(
                    "No main panel found. Please create one using the `/panel` command first."
                        .to_string(),
                );
            }
        }

        Ok(reply)
    }

    /// Start (or restart) the owner's timer and announce it in their private channel
    pub async fn start(
        &self,
        requester: &UserId,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> BotResult<Reply> {
        Self::require_owner(requester, owner)?;
        let outcome = self.store.start(owner, now)?;
        self.record_action("start", now);
        info!(owner = %owner, restarted = outcome.restarted, "Timer started by freelancer");

        let time_left = format_time_left(outcome.timer.remaining(now));
        let notice = format!(
            "⚡ **Work Timer Started**\nYou have started your work timer!\n\
             ⏱️ Time Remaining: {}\n📋 {}",
            time_left, START_INSTRUCTIONS
        );
        if let Err(e) = self
            .platform
            .send_message(&outcome.timer.private_channel_id, &notice)
            .await
        {
            error!(owner = %owner, "Error sending start message to private channel: {}", e);
        }

        self.refresh_panel(now).await;

        let message = if outcome.restarted {
            format!("⚡ Timer restarted with your previous duration! Time remaining: {}", time_left)
        } else {
            format!(
                "⚡ Timer started! Good luck with your work! Time remaining: {}. \
                 Check your private channel for details.",
                time_left
            )
        };
        Ok(Reply::new(message).with_timer(outcome.timer))
    }

    /// Remove the owner's timer and send the completion notice
    pub async fn complete(
        &self,
        requester: &UserId,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> BotResult<Reply> {
        Self::require_owner(requester, owner)?;
        let timer = self.store.complete(owner)?;
        self.record_action("complete", now);

        let notice = format!(
            "✅ **Work Completed**\n**Congratulations!** Your work has been marked as complete.\n\
             📋 Next Steps\n{}\n🎉 Thank you for completing your work on time.",
            COMPLETE_NEXT_STEPS
        );
        if let Err(e) = self
            .platform
            .send_message(&timer.private_channel_id, &notice)
            .await
        {
            error!(owner = %owner, "Error sending completion message to private channel: {}", e);
        }

        self.refresh_panel(now).await;
        Ok(Reply::new("Work marked as complete!").with_timer(timer))
    }

    /// Derive the current panel snapshot
    pub fn panel_state(&self, now: DateTime<Utc>) -> BotResult<PanelState> {
        Ok(PanelState::derive(&self.store.all()?, now))
    }

    /// Re-render the panel if one is bound; failures are logged only
    pub async fn refresh_panel(&self, now: DateTime<Utc>) {
        let Some(channel) = self.panel_channel() else {
            return;
        };
        let panel = match self.panel_state(now) {
            Ok(panel) => panel,
            Err(e) => {
                error!("Failed to derive panel state: {}", e);
                return;
            }
        };
        if let Err(e) = self.platform.render_panel(&channel, &panel).await {
            error!(channel = %channel, "Error updating main panel: {}", e);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
