//! `attributes` section.

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns, IndexedFields, IndexedFieldsJson};

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSCfg {
    pub enabled: bool,
    pub indexed: IndexedFields,
    pub stats_conns: Vec<String>,
    pub resources_conns: Vec<String>,
    pub accounts_conns: Vec<String>,
    pub process_runs: i64,
}

impl Default for AttributeSCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            indexed: IndexedFields::default(),
            stats_conns: Vec::new(),
            resources_conns: Vec::new(),
            accounts_conns: Vec::new(),
            process_runs: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSJson {
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub stats_conns: Option<Vec<String>>,
    pub resources_conns: Option<Vec<String>>,
    pub accounts_conns: Option<Vec<String>>,
    pub process_runs: Option<i64>,
}

impl Section for AttributeSCfg {
    const NAME: &'static str = "attributes";
    type Json = AttributeSJson;

    fn load_json(&mut self, jsn: Option<&AttributeSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.resources_conns, &jsn.resources_conns, subsystem::RESOURCES);
        set_conns(&mut self.accounts_conns, &jsn.accounts_conns, subsystem::ACCOUNTS);
        set(&mut self.process_runs, &jsn.process_runs);
        Ok(())
    }

    fn to_json(&self) -> AttributeSJson {
        AttributeSJson {
            enabled: Some(self.enabled),
            indexed: self.indexed.to_json(),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            resources_conns: conns_json(&self.resources_conns, subsystem::RESOURCES),
            accounts_conns: conns_json(&self.accounts_conns, subsystem::ACCOUNTS),
            process_runs: Some(self.process_runs),
        }
    }
}
