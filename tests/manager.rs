mod common;

use std::fs;
use std::sync::Arc;

use ocs_config::config::{
    ConfigError, ConfigManager, ConfigStore, JsonFileStore, MemoryStore, ReloadArgs,
};
use serde_json::json;

use common::{object, sample_dir, write_file};

#[tokio::test]
async fn test_reload_picks_up_file_changes() {
    let (_dir, path) = sample_dir();
    let manager = ConfigManager::load(Some(path.as_path()), None).unwrap();
    let mut events = manager.subscribe();
    assert_eq!(manager.snapshot().general.node_id, "ocs-1");

    fs::write(&path, r#"{"general": {"node_id": "ocs-9"}}"#).unwrap();
    manager
        .reload(&ReloadArgs {
            section: Some("general".to_string()),
            ..ReloadArgs::default()
        })
        .unwrap();

    let cfg = manager.snapshot();
    assert_eq!(cfg.general.node_id, "ocs-9");
    // Reloaded sections restart from defaults.
    assert_eq!(cfg.general.default_tenant, "cgrates.org");
    // Other sections keep their values.
    assert!(cfg.sessions.enabled);

    let event = events.recv().await.unwrap();
    assert_eq!(event.sections, vec!["general".to_string()]);
}

#[tokio::test]
async fn test_failed_reload_keeps_snapshot() {
    let (_dir, path) = sample_dir();
    let manager = ConfigManager::load(Some(path.as_path()), None).unwrap();
    let before = manager.snapshot();

    // Disabling stats breaks the sessions connection to it.
    fs::write(&path, r#"{"sessions": {"enabled": true, "stats_conns": ["*internal"]}}"#).unwrap();
    let err = manager.reload(&ReloadArgs::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(Arc::ptr_eq(&before, &manager.snapshot()));
}

#[tokio::test]
async fn test_dry_run_reload_changes_nothing() {
    let (dir, path) = sample_dir();
    let manager = ConfigManager::load(Some(path.as_path()), None).unwrap();
    let other = write_file(dir.path(), "other.json", r#"{"general": {"node_id": "dry"}}"#);

    manager
        .reload(&ReloadArgs {
            path: Some(other),
            section: None,
            dry_run: true,
        })
        .unwrap();
    assert_eq!(manager.snapshot().general.node_id, "ocs-1");
    assert_eq!(manager.config_path(), Some(path));
}

#[tokio::test]
async fn test_writes_are_persisted_and_restored() {
    let (dir, path) = sample_dir();
    let store_path = dir.path().join("store.json");
    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::open(&store_path).unwrap());
    let manager = ConfigManager::load(Some(path.as_path()), Some(store)).unwrap();

    manager
        .set_config(&object(json!({"cores": {"caps": 12, "caps_strategy": "*queue"}})), false)
        .unwrap();
    manager.set_config_from_json(r#"{"general": {"node_id": "stored"}}"#, false).unwrap();

    let persisted: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(persisted["cores"], json!({"caps": 12, "caps_strategy": "*queue"}));
    assert_eq!(persisted["general"], json!({"node_id": "stored"}));

    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::open(&store_path).unwrap());
    let restarted = ConfigManager::load(Some(path.as_path()), Some(store)).unwrap();
    assert_eq!(restarted.snapshot().cores.caps, 12);
    assert_eq!(restarted.snapshot().general.node_id, "stored");
}

#[tokio::test]
async fn test_store_in_db_saves_live_changes() {
    let (_dir, path) = sample_dir();
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn ConfigStore> = store.clone();
    let manager = ConfigManager::load(Some(path.as_path()), Some(shared)).unwrap();

    manager.store_in_db(&["general".to_string()]).unwrap();
    let stored = store.get_section("general").unwrap().unwrap();
    assert_eq!(stored["node_id"], "ocs-1");
    assert_eq!(stored["default_tenant"], "itsyscom.com");
    assert_eq!(store.get_section("cores").unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_readers_see_whole_snapshots() {
    let (_dir, path) = sample_dir();
    let manager = Arc::new(ConfigManager::load(Some(path.as_path()), None).unwrap());

    let writer = {
        let manager = Arc::clone(&manager);
        tokio::task::spawn_blocking(move || {
            for caps in 1..=50 {
                let doc = object(json!({"cores": {"caps": caps, "shutdown_timeout": format!("{caps}s")}}));
                manager.set_config(&doc, false).unwrap();
            }
        })
    };

    for _ in 0..200 {
        let cfg = manager.snapshot();
        if cfg.cores.caps > 0 {
            assert_eq!(cfg.cores.shutdown_timeout.as_secs(), cfg.cores.caps as u64);
        }
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(manager.snapshot().cores.caps, 50);
}
