//! Structural diff between two snapshots of a section.
//!
//! Both snapshots are rendered through `to_json` and compared as JSON values,
//! so one routine serves every section. The result is a sparse patch in the
//! section's option-typed carrier: unchanged fields stay `None`.
//!
//! ```text
//! v1.to_json() ─┐
//!               ├─ diff_values ─→ patch ─→ merge over d ─→ S::Json
//! v2.to_json() ─┘
//! ```
//!
//! Keys present only in `v1` are not reported; the option-typed carrier has
//! no way to express a removal.

use serde_json::{Map, Value};

use crate::config::error::ConfigError;
use crate::config::section::Section;

/// Patch carrying the fields of `v2` that differ from `v1`, merged over `d`.
pub fn diff_section<S: Section>(d: S::Json, v1: &S, v2: &S) -> Result<S::Json, ConfigError> {
    let a = serde_json::to_value(v1.to_json())?;
    let b = serde_json::to_value(v2.to_json())?;

    let mut merged = serde_json::to_value(d)?;
    prune_nulls(&mut merged);
    if let Some(patch) = diff_values(&a, &b) {
        merge_values(&mut merged, &patch);
    }
    Ok(serde_json::from_value(merged)?)
}

/// Difference between two JSON values, `None` when they are equal.
///
/// Objects are compared key by key; anything else is compared whole and
/// reported with `b`'s value.
pub fn diff_values(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::Object(a_map), Value::Object(b_map)) => {
            let mut out = Map::new();
            for (key, b_val) in b_map {
                if b_val.is_null() {
                    continue;
                }
                match a_map.get(key) {
                    Some(a_val) => {
                        if let Some(changed) = diff_values(a_val, b_val) {
                            out.insert(key.clone(), changed);
                        }
                    }
                    None => {
                        out.insert(key.clone(), b_val.clone());
                    }
                }
            }
            if out.is_empty() {
                None
            } else {
                Some(Value::Object(out))
            }
        }
        _ if a == b => None,
        _ => Some(b.clone()),
    }
}

/// Merge `overlay` into `base`, recursing into objects. Overlay wins.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Drop `null` members from every object in `value`.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                prune_nulls(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                prune_nulls(v);
            }
        }
        _ => {}
    }
}
