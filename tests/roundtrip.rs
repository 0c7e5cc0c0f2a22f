mod common;

use ocs_config::config::loader::{load_into, parse_document};
use ocs_config::config::{load_config, ChargingConfig, ConfigError, ValidationError, SECTION_NAMES};
use serde_json::{json, Value};

use common::{sample_dir, write_file, SAMPLE_CONFIG};

#[test]
fn test_sample_loads_and_validates() {
    let (_dir, path) = sample_dir();
    let cfg = load_config(&path).unwrap();

    assert_eq!(cfg.general.node_id, "ocs-1");
    assert_eq!(cfg.general.rounding_decimals, 4);
    assert_eq!(cfg.data_db.db_port, "internal");
    assert!(cfg.stats.store_disabled);
    assert_eq!(cfg.sessions.stir.payload_maxduration, None);
    assert_eq!(
        cfg.sessions.stats_conns,
        vec!["*internal:*stats".to_string(), "conn_rating".to_string()]
    );
    assert_eq!(cfg.diameter_agent.request_processors.len(), 1);
    let field = &cfg.diameter_agent.request_processors[0].request_fields[0];
    assert_eq!(field.tag, "*cgreq.ToR");
    assert_eq!(field.kind, "*constant");
}

#[test]
fn test_as_map_reloads_to_same_config() {
    let (_dir, path) = sample_dir();
    let cfg = load_config(&path).unwrap();

    let text = serde_json::to_string(&cfg.as_map()).unwrap();
    let reloaded = ChargingConfig::from_document(&parse_document(&text).unwrap()).unwrap();
    assert_eq!(reloaded, cfg);
}

#[test]
fn test_as_map_hides_internal_tags() {
    let (_dir, path) = sample_dir();
    let cfg = load_config(&path).unwrap();
    let map = cfg.as_map();
    assert_eq!(map["sessions"]["stats_conns"], json!(["*internal", "conn_rating"]));
    assert_eq!(map["stats"]["store_interval"], "-1");
    assert_eq!(map["sessions"]["stir"]["payload_maxduration"], "-1");
}

#[test]
fn test_diff_between_documents() {
    let (dir, old_path) = sample_dir();
    let new_text = SAMPLE_CONFIG.replace("\"ocs-1\"", "\"ocs-2\"");
    let new_path = write_file(dir.path(), "new/ocs.json", &new_text);

    let old = load_config(&old_path).unwrap();
    let new = load_config(&new_path).unwrap();
    let patch = old.diff(&new, SECTION_NAMES).unwrap();
    assert_eq!(Value::Object(patch), json!({"general": {"node_id": "ocs-2"}}));
}

#[test]
fn test_directory_layers_files() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "00_base.json", SAMPLE_CONFIG);
    write_file(
        dir.path(),
        "10_override/general.json",
        r#"{"general": {"node_id": "override"}}"#,
    );

    let cfg = load_config(dir.path()).unwrap();
    assert_eq!(cfg.general.node_id, "override");
    assert_eq!(cfg.general.default_tenant, "itsyscom.com");
}

#[test]
fn test_invalid_values_fail_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bad.json", r#"{"sessions": {"channel_sync_interval": "soon"}}"#);
    let mut cfg = ChargingConfig::default();
    assert!(matches!(
        load_into(&mut cfg, &path, None),
        Err(ConfigError::InvalidDuration(_))
    ));

    let path = write_file(dir.path(), "repl.json", r#"{"data_db": {"replication_conns": ["*internal"]}}"#);
    assert!(matches!(
        load_config(&path),
        Err(ConfigError::InternalConnNotAllowed(_))
    ));
}

#[test]
fn test_sanity_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "ocs.json",
        r#"{
            "sessions": {"enabled": true, "stats_conns": ["*internal"], "cdrs_conns": ["nowhere"]},
            "cores": {"caps_strategy": "*drop"},
        }"#,
    );
    let Err(ConfigError::Validation(errors)) = load_config(&path) else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors,
        vec![
            ValidationError::ServiceNotEnabled {
                service: "stats",
                requested_by: "sessions",
            },
            ValidationError::UnknownConnection {
                section: "sessions",
                conn: "nowhere".to_string(),
            },
            ValidationError::UnknownCapsStrategy("*drop".to_string()),
        ]
    );
}
