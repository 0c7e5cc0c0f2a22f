//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::TempDir;

/// A configuration exercising most sections, with comments and trailing commas.
pub const SAMPLE_CONFIG: &str = r#"
// charging node used by the integration tests
{
    "general": {
        "node_id": "ocs-1",
        "default_tenant": "itsyscom.com",
        "rounding_decimals": 4,
    },
    "rpc_conns": {
        "conn_rating": {
            "strategy": "*first",
            "conns": [{"address": "10.0.0.1:2012", "transport": "*json"}],
        },
    },
    "data_db": {
        "db_type": "*internal",
        "db_port": -1,
    },
    "chargers": {"enabled": true},
    "stats": {"enabled": true, "store_interval": "-1"},
    "thresholds": {"enabled": true},
    "sessions": {
        "enabled": true,
        "chargers_conns": ["*internal"],
        "stats_conns": ["*internal", "conn_rating"],
        "thresholds_conns": ["*internal"],
        "default_usage": {"*voice": "1h", "*data": "1048576"},
        "stir": {"payload_maxduration": "-1"},
    },
    /* agents */
    "diameter_agent": {
        "enabled": true,
        "sessions_conns": ["*internal"],
        "request_processors": [
            {
                "id": "ccr",
                "flags": ["*initiate"],
                "request_fields": [
                    {"path": "*cgreq.ToR", "type": "*constant", "value": "*voice"},
                ],
            },
        ],
    },
}
"#;

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Temporary directory holding `SAMPLE_CONFIG` as `ocs.json`.
pub fn sample_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ocs.json", SAMPLE_CONFIG);
    (dir, path)
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}
