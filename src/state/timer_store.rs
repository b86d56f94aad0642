//! Authoritative in-memory store of timers, channel bindings and retained settings
//!
//! Every operation takes the single store mutex for its whole duration and never
//! holds it across an await point, so assign/start/complete and the scheduler's
//! reminder commits are serialized against each other.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{ChannelId, Timer, TimerSettings, UserId};
use crate::error::{BotError, BotResult};

#[derive(Debug, Default)]
struct StoreInner {
    timers: HashMap<UserId, Timer>,
    channels: HashMap<UserId, ChannelId>,
    settings: HashMap<UserId, TimerSettings>,
    next_id: u64,
}

impl StoreInner {
    fn insert_fresh(
        &mut self,
        owner_id: &UserId,
        settings: &TimerSettings,
        channel: ChannelId,
        now: DateTime<Utc>,
    ) -> BotResult<Timer> {
        let timer = Timer::new(self.next_id + 1, owner_id.clone(), settings, channel, now)
            .ok_or_else(overflow_error)?;
        self.next_id = timer.id;
        self.timers.insert(owner_id.clone(), timer.clone());
        Ok(timer)
    }
}

/// Result of a start request
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub timer: Timer,
    /// True when a fresh timer was rebuilt from retained settings
    pub restarted: bool,
}

/// Owner-keyed timer store; at most one timer per owner
#[derive(Debug, Default)]
pub struct TimerStore {
    inner: Mutex<StoreInner>,
}

fn overflow_error() -> BotError {
    BotError::InvalidDuration("duration is too long".to_string())
}

/// Check that `settings` yield a positive deadline representable from `now`
fn check_settings(settings: &TimerSettings, now: DateTime<Utc>) -> BotResult<()> {
    let duration = settings.duration().ok_or_else(overflow_error)?;
    if duration.num_milliseconds() <= 0 {
        return Err(BotError::InvalidDuration(
            "duration must be greater than zero".to_string(),
        ));
    }
    settings.end_time_from(now).ok_or_else(overflow_error)?;
    Ok(())
}

/// Validate an admin-supplied duration before it reaches the store
pub fn validate_duration(
    hours: f64,
    minutes: f64,
    now: DateTime<Utc>,
) -> BotResult<TimerSettings> {
    if !hours.is_finite() || !minutes.is_finite() {
        return Err(BotError::InvalidDuration("duration must be a finite number".to_string()));
    }
    if hours < 0.0 || minutes < 0.0 {
        return Err(BotError::InvalidDuration(
            "hours and minutes cannot be negative".to_string(),
        ));
    }
    let settings = TimerSettings::new(hours, minutes);
    check_settings(&settings, now)?;
    Ok(settings)
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> BotResult<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|e| BotError::StateLock(e.to_string()))
    }

    /// Create a timer for `owner_id`, replacing any existing one, and record the
    /// channel binding and retained settings
    pub fn assign(
        &self,
        owner_id: &UserId,
        settings: TimerSettings,
        private_channel_id: ChannelId,
        now: DateTime<Utc>,
    ) -> BotResult<Timer> {
        check_settings(&settings, now)?;

        let mut inner = self.lock()?;
        let timer = inner.insert_fresh(owner_id, &settings, private_channel_id.clone(), now)?;
        inner.channels.insert(owner_id.clone(), private_channel_id);
        inner.settings.insert(owner_id.clone(), settings);

        info!(
            owner = %owner_id,
            timer_id = timer.id,
            end_time = %timer.end_time,
            "Timer assigned"
        );
        Ok(timer)
    }

    /// Report the running timer, or rebuild one from retained settings
    pub fn start(&self, owner_id: &UserId, now: DateTime<Utc>) -> BotResult<StartOutcome> {
        let mut inner = self.lock()?;

        if let Some(timer) = inner.timers.get(owner_id) {
            debug!(owner = %owner_id, "Start requested for a running timer");
            return Ok(StartOutcome {
                timer: timer.clone(),
                restarted: false,
            });
        }

        let settings = *inner
            .settings
            .get(owner_id)
            .ok_or_else(|| BotError::NotAssigned(owner_id.clone()))?;
        let channel = inner
            .channels
            .get(owner_id)
            .cloned()
            .ok_or_else(|| BotError::NoPrivateChannel(owner_id.clone()))?;

        let timer = inner.insert_fresh(owner_id, &settings, channel, now)?;
        info!(
            owner = %owner_id,
            timer_id = timer.id,
            end_time = %timer.end_time,
            "Timer restarted from retained settings"
        );
        Ok(StartOutcome {
            timer,
            restarted: true,
        })
    }

    /// Remove the owner's timer, keeping the channel binding and settings
    pub fn complete(&self, owner_id: &UserId) -> BotResult<Timer> {
        let mut inner = self.lock()?;
        let timer = inner
            .timers
            .remove(owner_id)
            .ok_or_else(|| BotError::NotAssigned(owner_id.clone()))?;
        info!(owner = %owner_id, timer_id = timer.id, "Timer completed and removed");
        Ok(timer)
    }

    pub fn get(&self, owner_id: &UserId) -> BotResult<Option<Timer>> {
        Ok(self.lock()?.timers.get(owner_id).cloned())
    }

    /// Snapshot of every active timer, ordered by owner id
    pub fn all(&self) -> BotResult<Vec<Timer>> {
        let inner = self.lock()?;
        let mut timers: Vec<Timer> = inner.timers.values().cloned().collect();
        timers.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(timers)
    }

    pub fn len(&self) -> BotResult<usize> {
        Ok(self.lock()?.timers.len())
    }

    pub fn is_empty(&self) -> BotResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn channel_for(&self, owner_id: &UserId) -> BotResult<Option<ChannelId>> {
        Ok(self.lock()?.channels.get(owner_id).cloned())
    }

    pub fn settings_for(&self, owner_id: &UserId) -> BotResult<Option<TimerSettings>> {
        Ok(self.lock()?.settings.get(owner_id).copied())
    }

    /// Commit a delivered reminder.
    ///
    /// Only applies when the same timer instance is still stored and its count is
    /// still `expected_count`; returns false when it was completed, reassigned or
    /// already advanced in the meantime.
    pub fn record_reminder(
        &self,
        owner_id: &UserId,
        timer_id: u64,
        expected_count: u32,
        now: DateTime<Utc>,
    ) -> BotResult<bool> {
        let mut inner = self.lock()?;
        let Some(timer) = inner.timers.get_mut(owner_id) else {
            return Ok(false);
        };
        if timer.id != timer_id || timer.reminder_count != expected_count {
            return Ok(false);
        }

        timer.reminder_count += 1;
        timer.last_reminder_time = Some(match timer.last_reminder_time {
            Some(previous) if previous > now => previous,
            _ => now,
        });
        Ok(true)
    }
}
