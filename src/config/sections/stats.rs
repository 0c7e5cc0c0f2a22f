//! `stats` section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::resources::{load_store_interval, store_interval_json};
use crate::config::sections::{conns_json, set, set_conns, IndexedFields, IndexedFieldsJson};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSCfg {
    pub enabled: bool,
    pub store_interval: Duration,
    pub store_disabled: bool,
    pub store_uncompressed_limit: i64,
    pub indexed: IndexedFields,
    pub thresholds_conns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSJson {
    pub enabled: Option<bool>,
    pub store_interval: Option<String>,
    pub store_uncompressed_limit: Option<i64>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub thresholds_conns: Option<Vec<String>>,
}

impl Section for StatSCfg {
    const NAME: &'static str = "stats";
    type Json = StatSJson;

    fn load_json(&mut self, jsn: Option<&StatSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        load_store_interval(&mut self.store_interval, &mut self.store_disabled, &jsn.store_interval)?;
        set(&mut self.store_uncompressed_limit, &jsn.store_uncompressed_limit);
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        Ok(())
    }

    fn to_json(&self) -> StatSJson {
        StatSJson {
            enabled: Some(self.enabled),
            store_interval: store_interval_json(self.store_interval, self.store_disabled),
            store_uncompressed_limit: Some(self.store_uncompressed_limit),
            indexed: self.indexed.to_json(),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;

    #[test]
    fn test_stats_contract() {
        let mut sample = StatSCfg {
            enabled: true,
            store_interval: Duration::from_secs(5),
            store_uncompressed_limit: 100,
            thresholds_conns: vec!["*internal:*thresholds".to_string()],
            ..StatSCfg::default()
        };
        sample.indexed.string_indexed_fields = Some(vec!["*req.Tenant".to_string()]);
        assert_section_contract(&sample);
    }

    #[test]
    fn test_stats_malformed_interval() {
        let jsn = StatSJson {
            store_interval: Some("5 minutes".to_string()),
            ..StatSJson::default()
        };
        let mut cfg = StatSCfg::default();
        assert!(matches!(
            cfg.load_json(Some(&jsn)),
            Err(ConfigError::InvalidDuration(_))
        ));
    }
}
