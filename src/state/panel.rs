//! Panel state derived from the active timers

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Timer, UserId};

pub const EXPIRED: &str = "EXPIRED";

pub const PANEL_TITLE: &str = "🕒 Work Timer Control Panel";

pub const PANEL_INSTRUCTIONS: &str = "1. Admins assign timers using `/assign`\n\
    2. Assigned freelancers can use the buttons below\n\
    3. Countdown timers will appear here when assigned";

pub const PANEL_EMPTY: &str =
    "No active timers currently. Admins must assign timers to freelancers using the `/assign` command.";

/// One line of the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub owner_id: UserId,
    pub display_name: String,
    pub time_remaining: String,
    pub total_duration: String,
    pub expired: bool,
}

/// Snapshot rendered onto the panel message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub title: String,
    pub entries: Vec<PanelEntry>,
    pub instructions: String,
    /// Start/complete buttons are only clickable while a timer exists
    pub buttons_enabled: bool,
    pub generated_at: DateTime<Utc>,
}

impl PanelState {
    pub fn derive(timers: &[Timer], now: DateTime<Utc>) -> Self {
        let entries = timers
            .iter()
            .map(|timer| {
                let remaining = timer.remaining(now);
                PanelEntry {
                    owner_id: timer.owner_id.clone(),
                    display_name: timer.owner_id.mention(),
                    time_remaining: format_time_left(remaining),
                    total_duration: format_duration(timer.total_duration_hours),
                    expired: timer.is_expired(now),
                }
            })
            .collect::<Vec<_>>();

        Self {
            title: PANEL_TITLE.to_string(),
            buttons_enabled: !entries.is_empty(),
            entries,
            instructions: PANEL_INSTRUCTIONS.to_string(),
            generated_at: now,
        }
    }

    /// Plain-text body for platforms without rich embeds
    pub fn to_text(&self) -> String {
        let mut text = format!("**{}**\n\n", self.title);
        if self.entries.is_empty() {
            text.push_str(PANEL_EMPTY);
            text.push('\n');
        }
        for entry in &self.entries {
            text.push_str(&format!(
                "{}'s Timer\n⏱️ Time Remaining: {}\n📅 Total Duration: {}\n",
                entry.display_name, entry.time_remaining, entry.total_duration
            ));
        }
        text.push_str("\n📋 Instructions\n");
        text.push_str(&self.instructions);
        text
    }
}

/// Format a remaining duration as `[Dd ]HH:MM:SS`, or `EXPIRED` once it runs out
pub fn format_time_left(remaining: Duration) -> String {
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        return EXPIRED.to_string();
    }

    let seconds = millis / 1000;
    let days = seconds / 86_400;
    let hours = (seconds / 3600) % 24;
    let minutes = (seconds / 60) % 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}

/// Format fractional hours as whole hours plus a minutes remainder
pub fn format_duration(hours: f64) -> String {
    let whole_hours = hours.floor();
    let mut whole = whole_hours as i64;
    let mut minutes = ((hours - whole_hours) * 60.0).round() as i64;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }

    if minutes > 0 {
        format!("{} hours and {} minutes", whole, minutes)
    } else {
        format!("{} hours", whole)
    }
}
