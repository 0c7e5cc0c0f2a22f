//! Live configuration ownership and the runtime config API.
//!
//! # Data Flow
//! ```text
//! set_config / set_config_from_json / reload
//!     → writer lock
//!     → clone current snapshot
//!     → load fragment (document, path or store)
//!     → validate_config
//!     → dry run? stop here
//!     → swap snapshot, invalidate cached maps, broadcast ReloadEvent
//!     → store diff (writes only, when a store is configured)
//! ```
//!
//! # Design Decisions
//! - Readers never block: snapshots are `Arc`s behind `ArcSwap`
//! - One writer at a time; a failed write leaves the snapshot untouched
//! - Cached `as_map` values carry the generation they were rendered at, so a
//!   render racing a swap is never served afterwards

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::config::error::ConfigError;
use crate::config::loader::{load_into, parse_document};
use crate::config::schema::{resolve_sections, ChargingConfig, SECTION_NAMES};
use crate::config::store::{load_from_store, store_diff_sections, ConfigStore};
use crate::config::validation::validate_config;
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 16;

/// Sections changed by an applied write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    pub sections: Vec<String>,
}

/// Arguments of [`ConfigManager::reload`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReloadArgs {
    /// Path to reload from. Defaults to the path the manager was loaded from.
    pub path: Option<PathBuf>,
    /// Single section to reload; `None` or `*all` reloads everything.
    pub section: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
struct MapCache {
    generation: AtomicU64,
    /// Generation at which each section last changed.
    changed_at: DashMap<&'static str, u64>,
    entries: DashMap<&'static str, (u64, Value)>,
}

impl MapCache {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn get(&self, name: &'static str) -> Option<Value> {
        let entry = self.entries.get(name)?;
        let (rendered_at, value) = entry.value();
        let changed_at = self.changed_at.get(name).map(|g| *g).unwrap_or(0);
        (*rendered_at >= changed_at).then(|| value.clone())
    }

    fn insert(&self, name: &'static str, rendered_at: u64, value: Value) {
        self.entries.insert(name, (rendered_at, value));
    }

    /// Must run after the new snapshot is visible.
    fn invalidate(&self, sections: &[&'static str]) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        for &name in sections {
            self.changed_at.insert(name, generation);
            self.entries.remove(name);
        }
    }
}

/// Owner of the live configuration.
pub struct ConfigManager {
    current: ArcSwap<ChargingConfig>,
    writer: Mutex<()>,
    cache: MapCache,
    events: broadcast::Sender<ReloadEvent>,
    config_path: Mutex<Option<PathBuf>>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl ConfigManager {
    /// Wrap an already loaded configuration.
    pub fn new(config: ChargingConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current: ArcSwap::from_pointee(config),
            writer: Mutex::new(()),
            cache: MapCache::default(),
            events,
            config_path: Mutex::new(None),
            store: None,
        }
    }

    /// Load defaults, then `path`, then the store patches, and validate.
    pub fn load(
        path: Option<&Path>,
        store: Option<Arc<dyn ConfigStore>>,
    ) -> Result<Self, ConfigError> {
        let mut config = ChargingConfig::default();
        if let Some(path) = path {
            load_into(&mut config, path, None)?;
        }
        if let Some(store) = &store {
            load_from_store(&mut config, store.as_ref(), SECTION_NAMES)?;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;

        let mut manager = Self::new(config);
        manager.config_path = Mutex::new(path.map(Path::to_path_buf));
        manager.store = store;
        tracing::info!(
            path = ?path,
            store = manager.store.is_some(),
            "Configuration loaded"
        );
        Ok(manager)
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config_path(self, path: impl Into<PathBuf>) -> Self {
        *self.lock_path() = Some(path.into());
        self
    }

    /// Current configuration. Never observes a partial update.
    pub fn snapshot(&self) -> Arc<ChargingConfig> {
        self.current.load_full()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.events.subscribe()
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.lock_path().clone()
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Requested sections keyed by name. Empty or `*all` returns every section.
    pub fn get_config(&self, sections: &[String]) -> Result<Map<String, Value>, ConfigError> {
        let names = resolve_sections(sections)?;
        let rendered_at = self.cache.current_generation();
        let snapshot = self.snapshot();

        let mut out = Map::new();
        for name in names {
            let value = match self.cache.get(name) {
                Some(value) => {
                    metrics::record_cache_lookup(true);
                    value
                }
                None => {
                    metrics::record_cache_lookup(false);
                    let value = snapshot.section_as_map(name)?;
                    self.cache.insert(name, rendered_at, value.clone());
                    value
                }
            };
            out.insert(name.to_string(), value);
        }
        Ok(out)
    }

    /// [`get_config`](Self::get_config) rendered as JSON text.
    pub fn get_config_as_json(&self, sections: &[String]) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.get_config(sections)?)?)
    }

    /// Apply a map of section fragments.
    pub fn set_config(&self, config: &Map<String, Value>, dry_run: bool) -> Result<(), ConfigError> {
        if config.is_empty() {
            return Ok(());
        }
        let names = config
            .keys()
            .map(|key| {
                SECTION_NAMES
                    .iter()
                    .copied()
                    .find(|name| *name == key.as_str())
                    .ok_or_else(|| ConfigError::InvalidSection(key.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.write("set_config", &names, dry_run, |candidate| {
            candidate.load_sections(config, &names)
        })
    }

    /// Apply a whole configuration document given as JSON text.
    pub fn set_config_from_json(&self, text: &str, dry_run: bool) -> Result<(), ConfigError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let doc = parse_document(text)?;
        let names: Vec<&'static str> = SECTION_NAMES
            .iter()
            .copied()
            .filter(|name| doc.contains_key(*name))
            .collect();

        self.write("set_config_from_json", &names, dry_run, |candidate| {
            candidate.load_document(&doc)
        })
    }

    /// Reload sections from disk, or from the store when one is configured.
    ///
    /// The reloaded sections restart from their defaults, so values removed
    /// from the source do not linger.
    pub fn reload(&self, args: &ReloadArgs) -> Result<(), ConfigError> {
        if self.store.is_some() && args.path.is_some() {
            return Err(ConfigError::ReloadSourceConflict);
        }
        let path = args.path.clone().or_else(|| self.config_path());
        if path.is_none() && self.store.is_none() {
            return Err(ConfigError::MandatoryFieldMissing("path"));
        }
        let requested: Vec<String> = args.section.iter().cloned().collect();
        let names = resolve_sections(&requested)?;

        let result = self.write_unstored("reload", &names, args.dry_run, |candidate| {
            for name in &names {
                if let Some(section) = candidate.section_mut(name) {
                    section.reset();
                }
            }
            if let Some(path) = &path {
                load_into(candidate, path, Some(names.as_slice()))?;
            }
            if let Some(store) = &self.store {
                load_from_store(candidate, store.as_ref(), &names)?;
            }
            Ok(())
        });
        metrics::record_reload(result.is_ok());

        if result.is_ok() && !args.dry_run && args.path.is_some() {
            *self.lock_path() = path;
        }
        result
    }

    /// Persist the difference between the stored configuration and the live one.
    pub fn store_in_db(&self, sections: &[String]) -> Result<(), ConfigError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ConfigError::Store("no config store configured".to_string()))?;
        let names = resolve_sections(sections)?;

        let mut stored = ChargingConfig::default();
        load_from_store(&mut stored, store.as_ref(), SECTION_NAMES)?;
        store_diff_sections(store.as_ref(), &names, &stored, &self.snapshot())?;
        tracing::info!(sections = ?names, "Configuration stored");
        Ok(())
    }

    /// Clone, mutate, validate and swap, then persist the diff to the store.
    fn write<F>(
        &self,
        operation: &'static str,
        sections: &[&'static str],
        dry_run: bool,
        mutate: F,
    ) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut ChargingConfig) -> Result<(), ConfigError>,
    {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let old = self.snapshot();
        let result = self.apply(&old, sections, dry_run, mutate).and_then(|applied| {
            match (applied, &self.store) {
                (Some(new), Some(store)) => store_diff_sections(store.as_ref(), sections, &old, &new),
                _ => Ok(()),
            }
        });
        metrics::record_config_write(operation, result.is_ok());
        result
    }

    /// Like [`write`](Self::write) without touching the store.
    fn write_unstored<F>(
        &self,
        operation: &'static str,
        sections: &[&'static str],
        dry_run: bool,
        mutate: F,
    ) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut ChargingConfig) -> Result<(), ConfigError>,
    {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let old = self.snapshot();
        let result = self.apply(&old, sections, dry_run, mutate).map(|_| ());
        metrics::record_config_write(operation, result.is_ok());
        result
    }

    /// Returns the swapped-in snapshot, or `None` on a dry run.
    fn apply<F>(
        &self,
        old: &ChargingConfig,
        sections: &[&'static str],
        dry_run: bool,
        mutate: F,
    ) -> Result<Option<Arc<ChargingConfig>>, ConfigError>
    where
        F: FnOnce(&mut ChargingConfig) -> Result<(), ConfigError>,
    {
        let mut candidate = old.clone();
        mutate(&mut candidate)?;
        validate_config(&candidate).map_err(|errors| {
            tracing::warn!(sections = ?sections, errors = errors.len(), "Rejected configuration change");
            ConfigError::Validation(errors)
        })?;
        if dry_run {
            tracing::debug!(sections = ?sections, "Dry run passed");
            return Ok(None);
        }

        let new = Arc::new(candidate);
        self.current.store(Arc::clone(&new));
        self.cache.invalidate(sections);
        let _ = self.events.send(ReloadEvent {
            sections: sections.iter().map(|s| s.to_string()).collect(),
        });
        tracing::info!(sections = ?sections, "Configuration updated");
        Ok(Some(new))
    }

    fn lock_path(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        self.config_path.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("config_path", &self.config_path())
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::MemoryStore;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_get_config_selects_sections() {
        let manager = ConfigManager::new(ChargingConfig::default());
        let all = manager.get_config(&[]).unwrap();
        assert_eq!(all.len(), SECTION_NAMES.len());

        let some = manager.get_config(&["cores".to_string()]).unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some["cores"]["caps_strategy"], "*busy");

        assert!(matches!(
            manager.get_config(&["nope".to_string()]),
            Err(ConfigError::InvalidSection(_))
        ));
    }

    #[test]
    fn test_set_config_invalidates_cache() {
        let manager = ConfigManager::new(ChargingConfig::default());
        let before = manager.get_config(&["cores".to_string()]).unwrap();
        assert_eq!(before["cores"]["caps"], 0);

        manager.set_config(&map(json!({"cores": {"caps": 7}})), false).unwrap();
        let after = manager.get_config(&["cores".to_string()]).unwrap();
        assert_eq!(after["cores"]["caps"], 7);
        assert_eq!(manager.snapshot().cores.caps, 7);
    }

    #[test]
    fn test_dry_run_keeps_snapshot() {
        let manager = ConfigManager::new(ChargingConfig::default());
        let before = manager.snapshot();
        manager.set_config(&map(json!({"cores": {"caps": 7}})), true).unwrap();
        assert!(Arc::ptr_eq(&before, &manager.snapshot()));
    }

    #[test]
    fn test_invalid_write_is_rejected() {
        let manager = ConfigManager::new(ChargingConfig::default());
        let err = manager
            .set_config(&map(json!({"sessions": {"enabled": true, "stats_conns": ["*internal"]}})), false)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(!manager.snapshot().sessions.enabled);

        let err = manager.set_config(&map(json!({"bogus": {}})), false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection(name) if name == "bogus"));
    }

    #[test]
    fn test_write_broadcasts_touched_sections() {
        let manager = ConfigManager::new(ChargingConfig::default());
        let mut rx = manager.subscribe();
        manager
            .set_config_from_json(r#"{"general": {"node_id": "n1"}, "stats": {"enabled": true}}"#, false)
            .unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.sections, vec!["general".to_string(), "stats".to_string()]);
    }

    #[test]
    fn test_reload_needs_a_source() {
        let manager = ConfigManager::new(ChargingConfig::default());
        assert!(matches!(
            manager.reload(&ReloadArgs::default()),
            Err(ConfigError::MandatoryFieldMissing("path"))
        ));

        let manager = manager.with_store(Arc::new(MemoryStore::new()));
        let args = ReloadArgs {
            path: Some(PathBuf::from("/tmp/ocs")),
            ..ReloadArgs::default()
        };
        assert!(matches!(manager.reload(&args), Err(ConfigError::ReloadSourceConflict)));
    }

    #[test]
    fn test_write_persists_diff_to_store() {
        let store = Arc::new(MemoryStore::new());
        let manager = ConfigManager::new(ChargingConfig::default()).with_store(store.clone());
        manager.set_config(&map(json!({"cores": {"caps": 3}})), false).unwrap();
        assert_eq!(store.get_section("cores").unwrap(), Some(json!({"caps": 3})));

        manager.set_config(&map(json!({"cores": {"caps": 9}})), true).unwrap();
        assert_eq!(store.get_section("cores").unwrap(), Some(json!({"caps": 3})));
    }

    #[test]
    fn test_reload_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_section("general", json!({"node_id": "from_store"})).unwrap();
        let manager = ConfigManager::new(ChargingConfig::default()).with_store(store);
        manager
            .reload(&ReloadArgs {
                section: Some("general".to_string()),
                ..ReloadArgs::default()
            })
            .unwrap();
        assert_eq!(manager.snapshot().general.node_id, "from_store");
    }

    #[test]
    fn test_store_in_db_requires_store() {
        let manager = ConfigManager::new(ChargingConfig::default());
        assert!(matches!(manager.store_in_db(&[]), Err(ConfigError::Store(_))));
    }
}
