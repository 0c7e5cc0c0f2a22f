//! Persistent configuration store.
//!
//! # Responsibilities
//! - Keep one JSON patch per section, relative to the built-in defaults
//! - Layer stored patches over a configuration on load and reload
//! - Persist the difference between two configurations
//!
//! # Design Decisions
//! - The store holds sparse patches, never full sections
//! - A missing section is `None`, not an error

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::config::error::ConfigError;
use crate::config::schema::ChargingConfig;

/// Backend holding per-section configuration patches.
pub trait ConfigStore: Send + Sync {
    fn get_section(&self, name: &str) -> Result<Option<Value>, ConfigError>;

    fn set_section(&self, name: &str, value: Value) -> Result<(), ConfigError>;
}

/// In-memory store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get_section(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        Ok(self.sections.get(name).map(|v| v.value().clone()))
    }

    fn set_section(&self, name: &str, value: Value) -> Result<(), ConfigError> {
        self.sections.insert(name.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON document, rewritten on every write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the document at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Map::new()
        };
        tracing::debug!(path = %path.display(), sections = doc.len(), "Opened config store");
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn get_section(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        let doc = self
            .doc
            .lock()
            .map_err(|_| ConfigError::Store("store lock poisoned".to_string()))?;
        Ok(doc.get(name).cloned())
    }

    fn set_section(&self, name: &str, value: Value) -> Result<(), ConfigError> {
        let mut doc = self
            .doc
            .lock()
            .map_err(|_| ConfigError::Store("store lock poisoned".to_string()))?;
        doc.insert(name.to_string(), value);
        let content = serde_json::to_string_pretty(&*doc)?;
        fs::write(&self.path, content)
            .map_err(|e| ConfigError::io(self.path.display().to_string(), e))
    }
}

/// Layer the stored patches of `sections` onto `config`.
pub fn load_from_store(
    config: &mut ChargingConfig,
    store: &dyn ConfigStore,
    sections: &[&str],
) -> Result<(), ConfigError> {
    for name in sections {
        let Some(value) = store.get_section(name)? else {
            continue;
        };
        let section = config
            .section_mut(name)
            .ok_or_else(|| ConfigError::InvalidSection(name.to_string()))?;
        section.load_value(&value)?;
    }
    Ok(())
}

/// Merge the changes from `v1` to `v2` into the stored patch of each section.
pub fn store_diff_sections(
    store: &dyn ConfigStore,
    sections: &[&str],
    v1: &ChargingConfig,
    v2: &ChargingConfig,
) -> Result<(), ConfigError> {
    for name in sections {
        let (Some(old), Some(new)) = (v1.section(name), v2.section(name)) else {
            return Err(ConfigError::InvalidSection(name.to_string()));
        };
        let stored = store.get_section(name)?.unwrap_or(Value::Null);
        let patch = old.diff_value(stored, new)?;
        store.set_section(name, patch)?;
    }
    Ok(())
}
