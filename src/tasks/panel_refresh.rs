//! Panel countdown refresh background task

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Background task that re-renders the bound panel so countdowns stay current
pub async fn panel_refresh_task(state: Arc<AppState>, period: Duration) {
    info!("Starting panel refresh task (every {}s)", period.as_secs());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        state.refresh_panel(Utc::now()).await;
    }
}
