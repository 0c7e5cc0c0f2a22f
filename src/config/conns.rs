//! Connection ID handling shared by every section that references other services.
//!
//! A connection list may point at a peer defined in `rpc_conns` or at the
//! in-process service through the `*internal` marker. On load `*internal` is
//! rewritten to `*internal:<subsystem>` so the connection manager can tell which
//! service the internal call targets; [`strip_internal_conns`] reverses it for
//! `as_map` output.

use crate::config::error::ConfigError;

/// Marker for an in-process connection.
pub const META_INTERNAL: &str = "*internal";

/// Default connection pool defined in `rpc_conns`.
pub const META_LOCALHOST: &str = "*localhost";

/// Subsystem tags used as the `<subsystem>` half of an internal connection.
pub mod subsystem {
    pub const ACCOUNTS: &str = "*accounts";
    pub const ACTIONS: &str = "*actions";
    pub const ATTRIBUTES: &str = "*attributes";
    pub const CACHES: &str = "*caches";
    pub const CDRS: &str = "*cdrs";
    pub const CHARGERS: &str = "*chargers";
    pub const EES: &str = "*ees";
    pub const RATES: &str = "*rates";
    pub const RESOURCES: &str = "*resources";
    pub const ROUTES: &str = "*routes";
    pub const SESSIONS: &str = "*sessions";
    pub const STATS: &str = "*stats";
    pub const THRESHOLDS: &str = "*thresholds";
}

/// Rewrite every `*internal` id to `*internal:<subsystem>`.
pub fn tag_internal_conns(ids: &[String], subsystem: &str) -> Vec<String> {
    ids.iter()
        .map(|id| {
            if id == META_INTERNAL {
                internal_tag(subsystem)
            } else {
                id.clone()
            }
        })
        .collect()
}

/// Reverse [`tag_internal_conns`] for the same subsystem.
///
/// Tags for other subsystems are left alone so a value loaded back from the
/// output is identical to the input.
pub fn strip_internal_conns(ids: &[String], subsystem: &str) -> Vec<String> {
    let tag = internal_tag(subsystem);
    ids.iter()
        .map(|id| {
            if *id == tag {
                META_INTERNAL.to_string()
            } else {
                id.clone()
            }
        })
        .collect()
}

/// Copy a connection list that must reach a remote peer.
///
/// `what` names the list in the error, e.g. `"Replication"` or `"Remote"`.
pub fn reject_internal_conns(ids: &[String], what: &'static str) -> Result<Vec<String>, ConfigError> {
    if ids.iter().any(|id| id == META_INTERNAL) {
        return Err(ConfigError::InternalConnNotAllowed(what));
    }
    Ok(ids.to_vec())
}

/// The tagged form of `*internal` for `subsystem`.
pub fn internal_tag(subsystem: &str) -> String {
    format!("{META_INTERNAL}:{subsystem}")
}

/// Whether `id` routes to an in-process service, tagged or not.
pub fn is_internal(id: &str) -> bool {
    id == META_INTERNAL || id.starts_with("*internal:")
}
