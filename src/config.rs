//! Configuration and CLI argument handling

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::state::UserId;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "work-timer-bot")]
#[command(about = "Assigns work timers to freelancers and escalates overdue reminders")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "WORK_TIMER_PORT", default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "WORK_TIMER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Reminder scheduler tick in seconds
    #[arg(long, env = "WORK_TIMER_REMINDER_INTERVAL", default_value = "60")]
    pub reminder_interval: u64,

    /// Panel countdown refresh in seconds
    #[arg(long, env = "WORK_TIMER_PANEL_REFRESH", default_value = "10")]
    pub panel_refresh: u64,

    /// Base URL of the chat platform gateway; effects are only logged when unset
    #[arg(long, env = "WORK_TIMER_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Bearer token sent to the gateway
    #[arg(long, env = "WORK_TIMER_GATEWAY_TOKEN", hide_env_values = true)]
    pub gateway_token: Option<String>,

    /// Gateway request timeout in seconds
    #[arg(long, env = "WORK_TIMER_GATEWAY_TIMEOUT", default_value = "10")]
    pub gateway_timeout: u64,

    /// User ids allowed to run admin commands
    #[arg(long = "admin", env = "WORK_TIMER_ADMINS", value_delimiter = ',')]
    pub admins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments and environment
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Reject settings the background tasks cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.reminder_interval == 0 {
            bail!("--reminder-interval must be at least 1 second");
        }
        if self.panel_refresh == 0 {
            bail!("--panel-refresh must be at least 1 second");
        }
        if self.gateway_timeout == 0 {
            bail!("--gateway-timeout must be at least 1 second");
        }
        Ok(())
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn reminder_period(&self) -> Duration {
        Duration::from_secs(self.reminder_interval)
    }

    pub fn panel_refresh_period(&self) -> Duration {
        Duration::from_secs(self.panel_refresh)
    }

    pub fn gateway_timeout_period(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout)
    }

    pub fn admin_ids(&self) -> Vec<UserId> {
        self.admins
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(UserId::new)
            .collect()
    }
}
