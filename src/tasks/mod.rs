//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod panel_refresh;
pub mod reminder_scheduler;

// Re-export main functions
pub use panel_refresh::panel_refresh_task;
pub use reminder_scheduler::{reminder_scheduler_task, run_reminder_tick, TickReport};
