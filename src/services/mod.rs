//! Chat-platform collaborators
//!
//! The core only talks to the platform through [`ChatPlatform`]; the
//! implementations here decide where the effects actually go.

pub mod gateway;
pub mod log_platform;
pub mod platform;
#[cfg(any(test, feature = "test-util"))]
pub mod recording;

// Re-export main types
pub use gateway::GatewayPlatform;
pub use log_platform::LogPlatform;
pub use platform::{ChatPlatform, Principal};
#[cfg(any(test, feature = "test-util"))]
pub use recording::{Effect, RecordingPlatform};
