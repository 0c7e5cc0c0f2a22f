//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config manager, API handlers, watcher:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`section`, `path`, `sections`) rather than formatted text
//! - Metrics are cheap (atomic increments) and need no exporter to be recorded

pub mod logging;
pub mod metrics;
