//! `resources` section: resource allocation service and its usage options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{
    conns_json, duration_json, set, set_conns, set_duration, IndexedFields, IndexedFieldsJson,
};

/// Defaults applied to resource usage requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOpts {
    pub usage_id: String,
    pub usage_ttl: Duration,
    pub units: f64,
}

impl Default for ResourceOpts {
    fn default() -> Self {
        Self {
            usage_id: String::new(),
            usage_ttl: Duration::from_secs(72 * 3600),
            units: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptsJson {
    pub usage_id: Option<String>,
    pub usage_ttl: Option<String>,
    pub units: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSCfg {
    pub enabled: bool,
    /// `0` stores on every change; `-1` disables storing.
    pub store_interval: Duration,
    pub store_disabled: bool,
    pub indexed: IndexedFields,
    pub thresholds_conns: Vec<String>,
    pub opts: ResourceOpts,
}

impl Default for ResourceSCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            store_interval: Duration::ZERO,
            store_disabled: false,
            indexed: IndexedFields::default(),
            thresholds_conns: Vec::new(),
            opts: ResourceOpts::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSJson {
    pub enabled: Option<bool>,
    pub store_interval: Option<String>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub thresholds_conns: Option<Vec<String>>,
    pub opts: Option<ResourceOptsJson>,
}

/// `store_interval` of the stateful services: `-1` turns periodic storing off.
pub(crate) fn load_store_interval(
    interval: &mut Duration,
    disabled: &mut bool,
    src: &Option<String>,
) -> Result<(), ConfigError> {
    match src.as_deref().map(str::trim) {
        Some("-1") => {
            *interval = Duration::ZERO;
            *disabled = true;
        }
        Some(_) => {
            set_duration(interval, src)?;
            *disabled = false;
        }
        None => {}
    }
    Ok(())
}

pub(crate) fn store_interval_json(interval: Duration, disabled: bool) -> Option<String> {
    if disabled {
        Some("-1".to_string())
    } else {
        duration_json(interval)
    }
}

impl Section for ResourceSCfg {
    const NAME: &'static str = "resources";
    type Json = ResourceSJson;

    fn load_json(&mut self, jsn: Option<&ResourceSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        load_store_interval(&mut self.store_interval, &mut self.store_disabled, &jsn.store_interval)?;
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        if let Some(opts) = &jsn.opts {
            set(&mut self.opts.usage_id, &opts.usage_id);
            set_duration(&mut self.opts.usage_ttl, &opts.usage_ttl)?;
            set(&mut self.opts.units, &opts.units);
        }
        Ok(())
    }

    fn to_json(&self) -> ResourceSJson {
        ResourceSJson {
            enabled: Some(self.enabled),
            store_interval: store_interval_json(self.store_interval, self.store_disabled),
            indexed: self.indexed.to_json(),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            opts: Some(ResourceOptsJson {
                usage_id: Some(self.opts.usage_id.clone()),
                usage_ttl: duration_json(self.opts.usage_ttl),
                units: Some(self.opts.units),
            }),
        }
    }
}
