//! Work Timer Bot - assigns time-boxed work timers to freelancers
//!
//! The library holds the timer store, the escalating reminder scheduler and the
//! panel derivation, plus the HTTP surface a chat-platform gateway talks to.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{BotError, PlatformError};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
