//! Configuration subsystem of an online charging engine.
//!
//! Loads the engine's JSON configuration into typed sections, validates it,
//! diffs and persists it, and serves it over an authenticated HTTP API with
//! hot reload.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ChargingConfig, ConfigError, ConfigManager};
pub use lifecycle::Shutdown;
