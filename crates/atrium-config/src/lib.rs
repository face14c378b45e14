//! Configuration system for the atrium locomotion/interaction core.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! with hot-reload detection and forward/backward compatible serialization.
//! The core is a library, not an application, so there is no CLI layer; the
//! embedding application decides how to override settings.

mod config;
mod error;

pub use config::{CarryConfig, Config, DebugConfig, InputConfig, MovementConfig};
pub use error::ConfigError;
