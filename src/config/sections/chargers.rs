//! `chargers` section.

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns, IndexedFields, IndexedFieldsJson};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargerSCfg {
    pub enabled: bool,
    pub indexed: IndexedFields,
    pub attributes_conns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargerSJson {
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub attributes_conns: Option<Vec<String>>,
}

impl Section for ChargerSCfg {
    const NAME: &'static str = "chargers";
    type Json = ChargerSJson;

    fn load_json(&mut self, jsn: Option<&ChargerSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        Ok(())
    }

    fn to_json(&self) -> ChargerSJson {
        ChargerSJson {
            enabled: Some(self.enabled),
            indexed: self.indexed.to_json(),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
        }
    }
}
