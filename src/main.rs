//! Work Timer Bot - entry point
//!
//! Wires the configured chat platform into the shared state, spawns the
//! reminder scheduler and panel refresher, and serves the gateway API.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use work_timer_bot::{
    api::create_router,
    config::Config,
    services::{ChatPlatform, GatewayPlatform, LogPlatform},
    state::AppState,
    tasks::{panel_refresh_task, reminder_scheduler_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "work_timer_bot={},tower_http=info",
            config.log_level()
        ))
        .init();

    config.validate()?;

    info!("Starting work-timer-bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, reminder_interval={}s, panel_refresh={}s",
        config.host, config.port, config.reminder_interval, config.panel_refresh
    );

    let platform: Arc<dyn ChatPlatform> = match &config.gateway_url {
        Some(url) => {
            info!("Forwarding platform effects to gateway at {}", url);
            Arc::new(GatewayPlatform::new(
                url.clone(),
                config.gateway_token.clone(),
                config.gateway_timeout_period(),
            )?)
        }
        None => {
            info!("No gateway configured, platform effects will only be logged");
            Arc::new(LogPlatform::new())
        }
    };

    let admins = config.admin_ids();
    if admins.is_empty() {
        tracing::warn!("No admins configured; /panel and /assign will be rejected");
    }

    let state = Arc::new(AppState::new(
        platform,
        admins,
        config.host.clone(),
        config.port,
    ));

    // Start the background tasks
    let scheduler = tokio::spawn(reminder_scheduler_task(
        Arc::clone(&state),
        config.reminder_period(),
    ));
    let refresher = tokio::spawn(panel_refresh_task(
        Arc::clone(&state),
        config.panel_refresh_period(),
    ));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /commands                   - Admin slash commands (panel, assign)");
    info!("  POST /interactions/button        - Panel button clicks");
    info!("  POST /timers/:owner_id/start     - Start or restart a timer");
    info!("  POST /timers/:owner_id/complete  - Complete a timer");
    info!("  GET  /timers                     - Active timers");
    info!("  GET  /panel                      - Derived panel state");
    info!("  GET  /status                     - Service status");
    info!("  GET  /health                     - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    scheduler.abort();
    refresher.abort();
    info!("Server shutdown complete");
    Ok(())
}
