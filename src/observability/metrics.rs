//! Metrics collection.
//!
//! # Metrics
//! - `ocs_config_writes_total` (counter): applied and rejected writes by operation
//! - `ocs_config_reloads_total` (counter): reloads by outcome
//! - `ocs_config_map_cache_total` (counter): `as_map` cache hits and misses
//! - `ocs_config_api_requests_total` (counter): API requests by route and status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Route labels are matched path templates, never raw paths

use std::time::Instant;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_config_write(operation: &'static str, ok: bool) {
    metrics::counter!(
        "ocs_config_writes_total",
        "operation" => operation,
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_reload(ok: bool) {
    metrics::counter!("ocs_config_reloads_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("ocs_config_map_cache_total", "result" => result).increment(1);
}

pub fn record_api_request(route: String, status: u16, start: Instant) {
    metrics::counter!(
        "ocs_config_api_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("ocs_config_api_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
