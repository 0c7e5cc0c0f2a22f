//! The contract every configuration section implements.
//!
//! # Responsibilities
//! - Tie a typed section to its JSON key and its option-typed JSON carrier
//! - Overlay a JSON fragment onto the current values (`load_json`)
//! - Produce a full JSON snapshot of the current values (`to_json`, `as_map`)
//!
//! # Design Decisions
//! - Every field of a `Json` carrier is an `Option`; `None` leaves the current value alone
//! - `as_map` is derived from `to_json`, so what is exported is exactly what can be loaded back
//! - [`DynSection`] erases the concrete type for name-based dispatch from the root config

use std::any::Any;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::diff::{diff_section, prune_nulls};
use crate::config::error::ConfigError;

/// A typed configuration section bound to one key of the JSON document.
pub trait Section: Clone + PartialEq + Default + Debug + Send + Sync + 'static {
    /// Key of the section in the JSON document.
    const NAME: &'static str;

    /// Option-typed JSON carrier. Absent fields deserialize to `None`.
    type Json: Serialize + DeserializeOwned + Default + Clone + PartialEq + Debug + Send + Sync;

    /// Overlay `jsn` onto the current values. `None` is a no-op.
    fn load_json(&mut self, jsn: Option<&Self::Json>) -> Result<(), ConfigError>;

    /// Snapshot of every field.
    fn to_json(&self) -> Self::Json;

    /// Flattened key/value view used by the API and the CLI.
    fn as_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self.to_json()) {
            Ok(mut value) => {
                prune_nulls(&mut value);
                match value {
                    Value::Object(map) => map,
                    _ => Map::new(),
                }
            }
            Err(e) => {
                tracing::error!(section = Self::NAME, error = %e, "Failed to render section");
                Map::new()
            }
        }
    }
}

/// Object-safe view over a [`Section`] used by name-based lookups.
pub trait DynSection: Debug + Send + Sync {
    /// Key of the section in the JSON document.
    fn name(&self) -> &'static str;

    /// Decode `value` into the section's JSON carrier and overlay it.
    fn load_value(&mut self, value: &Value) -> Result<(), ConfigError>;

    /// `as_map` wrapped in a `Value`.
    fn as_map_value(&self) -> Value;

    /// Patch that turns `self` into `newer`, merged over the `stored` patch.
    fn diff_value(&self, stored: Value, newer: &dyn DynSection) -> Result<Value, ConfigError>;

    /// Restore the built-in defaults.
    fn reset(&mut self);

    fn as_any(&self) -> &dyn Any;
}

impl<S: Section> DynSection for S {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn load_value(&mut self, value: &Value) -> Result<(), ConfigError> {
        let jsn: S::Json = serde_json::from_value(value.clone())?;
        self.load_json(Some(&jsn))
    }

    fn as_map_value(&self) -> Value {
        Value::Object(self.as_map())
    }

    fn diff_value(&self, stored: Value, newer: &dyn DynSection) -> Result<Value, ConfigError> {
        let newer = newer
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(|| ConfigError::InvalidSection(newer.name().to_string()))?;
        let stored: S::Json = if stored.is_null() {
            S::Json::default()
        } else {
            serde_json::from_value(stored)?
        };
        let mut patch = serde_json::to_value(diff_section(stored, self, newer)?)?;
        prune_nulls(&mut patch);
        Ok(patch)
    }

    fn reset(&mut self) {
        *self = S::default();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
