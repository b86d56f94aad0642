//! State management module
//!
//! This module contains the timer records, the store that owns them, the
//! escalation policy and the derived panel state.

pub mod app_state;
pub mod escalation;
pub mod panel;
pub mod timer;
pub mod timer_store;

// Re-export main types
pub use app_state::{AppState, Reply};
pub use escalation::{due_tier, should_remind, ReminderTier};
pub use panel::{format_duration, format_time_left, PanelEntry, PanelState};
pub use timer::{ChannelId, Timer, TimerSettings, UserId};
pub use timer_store::{validate_duration, StartOutcome, TimerStore};
