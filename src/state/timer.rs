//! Timer record and the identities it refers to

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Opaque chat-platform user identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Platform mention syntax, used to ping the owner in reminder texts
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque chat-platform channel identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Duration an owner was last assigned, kept after the timer itself is gone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub hours: f64,
    pub minutes: f64,
    pub total_duration_hours: f64,
}

impl TimerSettings {
    pub fn new(hours: f64, minutes: f64) -> Self {
        Self {
            hours,
            minutes,
            total_duration_hours: hours + minutes / 60.0,
        }
    }

    /// Wall-clock length of a timer built from these settings, `None` when it
    /// does not fit a `Duration`
    pub fn duration(&self) -> Option<Duration> {
        let millis = (self.hours * MILLIS_PER_HOUR + self.minutes * 60_000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        Duration::try_milliseconds(millis as i64)
    }

    /// Deadline of a timer started at `now`, `None` on calendar overflow
    pub fn end_time_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.duration()?)
    }

    /// Human readable form used in admin confirmations
    pub fn describe(&self) -> String {
        if self.minutes > 0.0 {
            format!("{} hours and {} minutes", self.hours, self.minutes)
        } else {
            format!("{} hours", self.hours)
        }
    }
}

/// One active work assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    /// Store-assigned generation, unique per created timer
    pub id: u64,
    pub owner_id: UserId,
    pub end_time: DateTime<Utc>,
    pub private_channel_id: ChannelId,
    pub reminder_count: u32,
    pub last_reminder_time: Option<DateTime<Utc>>,
    pub total_duration_hours: f64,
}

impl Timer {
    /// Build a fresh timer anchored at `now`; `None` if the deadline overflows
    pub fn new(
        id: u64,
        owner_id: UserId,
        settings: &TimerSettings,
        private_channel_id: ChannelId,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            id,
            owner_id,
            end_time: settings.end_time_from(now)?,
            private_channel_id,
            reminder_count: 0,
            last_reminder_time: None,
            total_duration_hours: settings.total_duration_hours,
        })
    }

    /// Time left until the deadline, negative once overdue
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.end_time - now
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// Fractional hours past the deadline (negative before it)
    pub fn hours_overdue(&self, now: DateTime<Utc>) -> f64 {
        (now - self.end_time).num_milliseconds() as f64 / MILLIS_PER_HOUR
    }
}
