//! Typed configuration sections.
//!
//! Each submodule owns one section (or a small family that shares types): the
//! typed struct with its built-in defaults, the option-typed JSON carrier and
//! the [`Section`](crate::config::section::Section) implementation tying them
//! together. The helpers below are the field-level building blocks of every
//! `load_json`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::{strip_internal_conns, tag_internal_conns};
use crate::config::duration::{format_duration, parse_duration, parse_duration_secs};
use crate::config::error::ConfigError;

pub mod accounts;
pub mod admins;
pub mod agents;
pub mod attributes;
pub mod cdrs;
pub mod chargers;
pub mod cores;
pub mod db;
pub mod general;
pub mod listen;
pub mod rals;
pub mod resources;
pub mod routes;
pub mod rpc_conns;
pub mod sessions;
pub mod stats;
pub mod thresholds;
pub mod tls;

pub use accounts::AccountSCfg;
pub use admins::AdminSCfg;
pub use agents::{DiameterAgentCfg, FieldTemplate, RadiusAgentCfg, RequestProcessor};
pub use attributes::AttributeSCfg;
pub use cdrs::CdrsCfg;
pub use chargers::ChargerSCfg;
pub use cores::CoreSCfg;
pub use db::{DataDbCfg, ItemOpts, StorDbCfg};
pub use general::GeneralCfg;
pub use listen::ListenCfg;
pub use rals::RalSCfg;
pub use resources::ResourceSCfg;
pub use routes::RouteSCfg;
pub use rpc_conns::{RemoteHost, RpcConn, RpcConnsCfg};
pub use sessions::{SessionSCfg, StirCfg};
pub use stats::StatSCfg;
pub use thresholds::ThresholdSCfg;
pub use tls::TlsCfg;

pub(crate) fn set<T: Clone>(dst: &mut T, src: &Option<T>) {
    if let Some(v) = src {
        *dst = v.clone();
    }
}

pub(crate) fn set_conns(dst: &mut Vec<String>, src: &Option<Vec<String>>, subsystem: &str) {
    if let Some(ids) = src {
        *dst = tag_internal_conns(ids, subsystem);
    }
}

pub(crate) fn set_set(dst: &mut BTreeSet<String>, src: &Option<Vec<String>>) {
    if let Some(items) = src {
        *dst = items.iter().cloned().collect();
    }
}

pub(crate) fn set_duration(dst: &mut Duration, src: &Option<String>) -> Result<(), ConfigError> {
    if let Some(raw) = src {
        *dst = parse_duration(raw)?;
    }
    Ok(())
}

pub(crate) fn set_duration_secs(dst: &mut Duration, src: &Option<String>) -> Result<(), ConfigError> {
    if let Some(raw) = src {
        *dst = parse_duration_secs(raw)?;
    }
    Ok(())
}

/// Merge a map of duration strings into `dst`, key by key.
pub(crate) fn merge_durations(
    dst: &mut BTreeMap<String, Duration>,
    src: &Option<BTreeMap<String, String>>,
) -> Result<(), ConfigError> {
    if let Some(items) = src {
        for (key, raw) in items {
            dst.insert(key.clone(), parse_duration(raw)?);
        }
    }
    Ok(())
}

pub(crate) fn conns_json(ids: &[String], subsystem: &str) -> Option<Vec<String>> {
    Some(strip_internal_conns(ids, subsystem))
}

pub(crate) fn set_json(items: &BTreeSet<String>) -> Option<Vec<String>> {
    Some(items.iter().cloned().collect())
}

pub(crate) fn duration_json(d: Duration) -> Option<String> {
    Some(format_duration(d))
}

/// Duration map rendering: `*any` and `*voice` as duration text, the rest as
/// integer nanoseconds.
pub(crate) fn durations_json(items: &BTreeMap<String, Duration>) -> Option<BTreeMap<String, String>> {
    Some(
        items
            .iter()
            .map(|(key, d)| {
                let text = match key.as_str() {
                    "*any" | "*voice" => format_duration(*d),
                    _ => d.as_nanos().to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
    )
}

/// Filter index settings shared by the profile-based services.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFields {
    pub indexed_selects: bool,
    /// `None` means every field may be indexed.
    pub string_indexed_fields: Option<Vec<String>>,
    pub prefix_indexed_fields: Option<Vec<String>>,
    pub suffix_indexed_fields: Option<Vec<String>>,
    pub exists_indexed_fields: Option<Vec<String>>,
    pub notexists_indexed_fields: Option<Vec<String>>,
    pub nested_fields: bool,
}

impl Default for IndexedFields {
    fn default() -> Self {
        Self {
            indexed_selects: true,
            string_indexed_fields: None,
            prefix_indexed_fields: Some(Vec::new()),
            suffix_indexed_fields: Some(Vec::new()),
            exists_indexed_fields: Some(Vec::new()),
            notexists_indexed_fields: Some(Vec::new()),
            nested_fields: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedFieldsJson {
    pub indexed_selects: Option<bool>,
    pub string_indexed_fields: Option<Vec<String>>,
    pub prefix_indexed_fields: Option<Vec<String>>,
    pub suffix_indexed_fields: Option<Vec<String>>,
    pub exists_indexed_fields: Option<Vec<String>>,
    pub notexists_indexed_fields: Option<Vec<String>>,
    pub nested_fields: Option<bool>,
}

impl IndexedFields {
    pub(crate) fn load_json(&mut self, jsn: &IndexedFieldsJson) {
        set(&mut self.indexed_selects, &jsn.indexed_selects);
        for (dst, src) in [
            (&mut self.string_indexed_fields, &jsn.string_indexed_fields),
            (&mut self.prefix_indexed_fields, &jsn.prefix_indexed_fields),
            (&mut self.suffix_indexed_fields, &jsn.suffix_indexed_fields),
            (&mut self.exists_indexed_fields, &jsn.exists_indexed_fields),
            (&mut self.notexists_indexed_fields, &jsn.notexists_indexed_fields),
        ] {
            if src.is_some() {
                *dst = src.clone();
            }
        }
        set(&mut self.nested_fields, &jsn.nested_fields);
    }

    pub(crate) fn to_json(&self) -> IndexedFieldsJson {
        IndexedFieldsJson {
            indexed_selects: Some(self.indexed_selects),
            string_indexed_fields: self.string_indexed_fields.clone(),
            prefix_indexed_fields: self.prefix_indexed_fields.clone(),
            suffix_indexed_fields: self.suffix_indexed_fields.clone(),
            exists_indexed_fields: self.exists_indexed_fields.clone(),
            notexists_indexed_fields: self.notexists_indexed_fields.clone(),
            nested_fields: Some(self.nested_fields),
        }
    }
}

/// Shared checks every section has to pass.
#[cfg(test)]
pub(crate) mod contract {
    use crate::config::diff::diff_section;
    use crate::config::section::Section;

    /// `sample` should differ from the defaults in as many fields as possible.
    pub(crate) fn assert_section_contract<S: Section>(sample: &S) {
        let mut unchanged = sample.clone();
        unchanged.load_json(None).unwrap();
        assert_eq!(&unchanged, sample, "{}: load_json(None) must be a no-op", S::NAME);

        let map = sample.as_map();
        let jsn: S::Json = serde_json::from_value(serde_json::Value::Object(map)).unwrap();
        let mut reloaded = S::default();
        reloaded.load_json(Some(&jsn)).unwrap();
        assert_eq!(&reloaded, sample, "{}: as_map must load back", S::NAME);

        let same = diff_section(S::Json::default(), sample, &sample.clone()).unwrap();
        assert_eq!(same, S::Json::default(), "{}: equal snapshots give an empty patch", S::NAME);

        let patch = diff_section(S::Json::default(), &S::default(), sample).unwrap();
        let mut patched = S::default();
        patched.load_json(Some(&patch)).unwrap();
        assert_eq!(&patched, sample, "{}: patch must reproduce the newer snapshot", S::NAME);
    }
}
