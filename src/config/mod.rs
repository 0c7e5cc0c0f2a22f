//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config path (JSON file or directory)
//!     → loader.rs (strip comments, parse documents)
//!     → sections/* (overlay each fragment onto defaults)
//!     → validation.rs (semantic checks)
//!     → ChargingConfig (validated snapshot)
//!     → manager.rs (ArcSwap, shared with the API)
//!
//! On change (API write, watcher, SIGHUP):
//!     → manager.rs clones, loads, validates
//!     → atomic swap of Arc<ChargingConfig>
//!     → ReloadEvent broadcast with the touched sections
//!     → store.rs receives the diff (diff.rs) when configured
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; every change produces a new one
//! - All fields have defaults so a document only names what it changes
//! - Validation separates syntactic (serde) from semantic checks

pub mod conns;
pub mod diff;
pub mod duration;
pub mod error;
pub mod loader;
pub mod manager;
pub mod schema;
pub mod section;
pub mod sections;
pub mod store;
pub mod validation;
pub mod watcher;

pub use error::ConfigError;
pub use loader::load_config;
pub use manager::{ConfigManager, ReloadArgs, ReloadEvent};
pub use schema::{ChargingConfig, ALL_SECTIONS, SECTION_NAMES};
pub use section::{DynSection, Section};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
pub use validation::{validate_config, ValidationError};
