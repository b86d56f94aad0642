//! Escalating reminder scheduler background task

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::state::{due_tier, AppState};

/// Outcome of one scheduler tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Reminders delivered and committed
    pub sent: usize,
    /// Sends that failed; the timer is retried next tick
    pub failed: usize,
    /// Delivered but the timer changed mid-send, nothing committed
    pub stale: usize,
}

/// Background task that scans all timers every `period` and sends due reminders
pub async fn reminder_scheduler_task(state: Arc<AppState>, period: Duration) {
    info!("Starting reminder scheduler task (every {}s)", period.as_secs());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let report = run_reminder_tick(&state, Utc::now()).await;
        if report.sent > 0 || report.failed > 0 {
            info!(
                sent = report.sent,
                failed = report.failed,
                stale = report.stale,
                "Reminder tick finished"
            );
        }
    }
}

/// Scan every timer once at `now` and send at most one reminder per due timer.
///
/// Reminder state is committed only after the send succeeds, and only if the
/// same timer instance is still stored with the count that was read.
pub async fn run_reminder_tick(state: &AppState, now: DateTime<Utc>) -> TickReport {
    let mut report = TickReport::default();

    let timers = match state.store.all() {
        Ok(timers) => timers,
        Err(e) => {
            error!("Failed to read timers for reminder tick: {}", e);
            return report;
        }
    };
    debug!(
        "Checking reminders at {} - Active timers: {}",
        now.to_rfc3339(),
        timers.len()
    );

    for timer in timers {
        let Some(tier) = due_tier(&timer, now) else {
            continue;
        };

        let reminder_number = timer.reminder_count + 1;
        info!(
            owner = %timer.owner_id,
            hours_overdue = timer.hours_overdue(now),
            "Sending reminder #{} ({:?})",
            reminder_number,
            tier
        );

        let content = tier.message(&timer.owner_id);
        if let Err(e) = state
            .platform
            .send_message(&timer.private_channel_id, &content)
            .await
        {
            warn!(
                owner = %timer.owner_id,
                channel = %timer.private_channel_id,
                "Error sending reminder, will retry next tick: {}",
                e
            );
            report.failed += 1;
            continue;
        }

        match state
            .store
            .record_reminder(&timer.owner_id, timer.id, timer.reminder_count, now)
        {
            Ok(true) => {
                debug!(
                    owner = %timer.owner_id,
                    "Reminder sent successfully. New reminder count: {}",
                    reminder_number
                );
                report.sent += 1;
            }
            Ok(false) => {
                debug!(
                    owner = %timer.owner_id,
                    "Timer completed or reassigned while its reminder was in flight"
                );
                report.stale += 1;
            }
            Err(e) => {
                error!(owner = %timer.owner_id, "Failed to record reminder: {}", e);
                report.failed += 1;
            }
        }
    }

    report
}
