//! `thresholds` section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::resources::{load_store_interval, store_interval_json};
use crate::config::sections::{conns_json, set, set_conns, IndexedFields, IndexedFieldsJson};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdSCfg {
    pub enabled: bool,
    pub store_interval: Duration,
    pub store_disabled: bool,
    pub indexed: IndexedFields,
    pub actions_conns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSJson {
    pub enabled: Option<bool>,
    pub store_interval: Option<String>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub actions_conns: Option<Vec<String>>,
}

impl Section for ThresholdSCfg {
    const NAME: &'static str = "thresholds";
    type Json = ThresholdSJson;

    fn load_json(&mut self, jsn: Option<&ThresholdSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        load_store_interval(&mut self.store_interval, &mut self.store_disabled, &jsn.store_interval)?;
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.actions_conns, &jsn.actions_conns, subsystem::ACTIONS);
        Ok(())
    }

    fn to_json(&self) -> ThresholdSJson {
        ThresholdSJson {
            enabled: Some(self.enabled),
            store_interval: store_interval_json(self.store_interval, self.store_disabled),
            indexed: self.indexed.to_json(),
            actions_conns: conns_json(&self.actions_conns, subsystem::ACTIONS),
        }
    }
}
