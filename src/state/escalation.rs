//! Escalating reminder policy
//!
//! The tier table is indexed by a timer's `reminder_count`: tier `k` may only
//! fire while the overdue hours sit inside its band, and never twice because
//! sending it moves the count to `k + 1`.

use chrono::{DateTime, Utc};

use super::{Timer, UserId};

/// One escalation level in the reminder sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTier {
    DeadlinePassed,
    TwelveHours,
    OneDay,
    TwoDays,
    FinalWarning,
    FinalDecision,
}

/// Tier table in `reminder_count` order
pub const TIERS: [ReminderTier; 6] = [
    ReminderTier::DeadlinePassed,
    ReminderTier::TwelveHours,
    ReminderTier::OneDay,
    ReminderTier::TwoDays,
    ReminderTier::FinalWarning,
    ReminderTier::FinalDecision,
];

impl ReminderTier {
    /// Tier due next for a timer that has already sent `reminder_count` reminders
    pub fn for_count(reminder_count: u32) -> Option<Self> {
        TIERS.get(reminder_count as usize).copied()
    }

    /// Overdue-hours band `[start, end)` in which this tier fires
    pub fn band(&self) -> (f64, Option<f64>) {
        match self {
            ReminderTier::DeadlinePassed => (0.0, None),
            ReminderTier::TwelveHours => (12.0, Some(24.0)),
            ReminderTier::OneDay => (24.0, Some(48.0)),
            ReminderTier::TwoDays => (48.0, Some(72.0)),
            ReminderTier::FinalWarning => (72.0, Some(96.0)),
            ReminderTier::FinalDecision => (96.0, None),
        }
    }

    pub fn contains(&self, hours_overdue: f64) -> bool {
        let (start, end) = self.band();
        hours_overdue >= start && end.map_or(true, |end| hours_overdue < end)
    }

    /// Reminder text addressed to `owner`
    pub fn message(&self, owner: &UserId) -> String {
        let body = match self {
            ReminderTier::DeadlinePassed => {
                "⏳ Your deadline has passed. We have not received your submission or an update. \
                 If there is a delay, you need to make us aware of the reason and provide a specific \
                 updated timeline for delivery."
            }
            ReminderTier::TwelveHours => {
                "🚨 12 hours overdue. We still haven't received your submission or an update. \
                 This must be addressed immediately. Let us know your status and when we can expect delivery."
            }
            ReminderTier::OneDay => {
                "⚠️ 24 hours overdue. This delay is now affecting the project timeline, which is not \
                 acceptable. We need an immediate update with a firm delivery time."
            }
            ReminderTier::TwoDays => {
                "⏳ 48 hours overdue. This extended delay is causing significant issues. We need to know \
                 exactly when this will be delivered. A lack of communication will force us to take further action."
            }
            ReminderTier::FinalWarning => {
                "🚨 72 hours overdue. This is the second-last reminder. If we do not receive a response in \
                 the next 24 hours, we will begin looking for another candidate to complete this task. \
                 Please respond with an immediate update."
            }
            ReminderTier::FinalDecision => {
                "❗ Final Decision: 4 days overdue. Since we have not received an update, we will be moving \
                 forward with another candidate to complete this task. If you wish to discuss this further, \
                 reach out immediately, but we can no longer wait."
            }
        };
        format!("{} {}", owner.mention(), body)
    }
}

/// Whether `timer` is due for its next reminder at `now`
pub fn should_remind(timer: &Timer, now: DateTime<Utc>) -> bool {
    if !timer.is_expired(now) {
        return false;
    }
    if timer.reminder_count == 0 {
        return true;
    }
    match ReminderTier::for_count(timer.reminder_count) {
        Some(tier) => tier.contains(timer.hours_overdue(now)),
        // terminal hold after the final decision
        None => false,
    }
}

/// Tier to send if `timer` is due at `now`
pub fn due_tier(timer: &Timer, now: DateTime<Utc>) -> Option<ReminderTier> {
    if should_remind(timer, now) {
        ReminderTier::for_count(timer.reminder_count)
    } else {
        None
    }
}
