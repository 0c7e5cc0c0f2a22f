//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the default filter
//! - JSON-free, human readable output; one event per line

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "ocs_config=info,tower_http=info";

/// Install the global subscriber. `verbose` raises the default to debug.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "ocs_config=debug,tower_http=debug"
    } else {
        DEFAULT_FILTER
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
