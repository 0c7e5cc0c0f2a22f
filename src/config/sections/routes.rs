//! `routes` section: least-cost and quality-based routing service.

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns, IndexedFields, IndexedFieldsJson};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSCfg {
    pub enabled: bool,
    pub indexed: IndexedFields,
    pub attributes_conns: Vec<String>,
    pub resources_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub accounts_conns: Vec<String>,
    pub rates_conns: Vec<String>,
    pub default_ratio: i64,
}

impl Default for RouteSCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            indexed: IndexedFields::default(),
            attributes_conns: Vec::new(),
            resources_conns: Vec::new(),
            stats_conns: Vec::new(),
            accounts_conns: Vec::new(),
            rates_conns: Vec::new(),
            default_ratio: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSJson {
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub attributes_conns: Option<Vec<String>>,
    pub resources_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub accounts_conns: Option<Vec<String>>,
    pub rates_conns: Option<Vec<String>>,
    pub default_ratio: Option<i64>,
}

impl Section for RouteSCfg {
    const NAME: &'static str = "routes";
    type Json = RouteSJson;

    fn load_json(&mut self, jsn: Option<&RouteSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        set_conns(&mut self.resources_conns, &jsn.resources_conns, subsystem::RESOURCES);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.accounts_conns, &jsn.accounts_conns, subsystem::ACCOUNTS);
        set_conns(&mut self.rates_conns, &jsn.rates_conns, subsystem::RATES);
        set(&mut self.default_ratio, &jsn.default_ratio);
        Ok(())
    }

    fn to_json(&self) -> RouteSJson {
        RouteSJson {
            enabled: Some(self.enabled),
            indexed: self.indexed.to_json(),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
            resources_conns: conns_json(&self.resources_conns, subsystem::RESOURCES),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            accounts_conns: conns_json(&self.accounts_conns, subsystem::ACCOUNTS),
            rates_conns: conns_json(&self.rates_conns, subsystem::RATES),
            default_ratio: Some(self.default_ratio),
        }
    }
}
