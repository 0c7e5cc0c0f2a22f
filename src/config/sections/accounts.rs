//! `accounts` section: balance management service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{
    conns_json, duration_json, set, set_conns, set_duration, IndexedFields, IndexedFieldsJson,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSCfg {
    pub enabled: bool,
    pub indexed: IndexedFields,
    pub attributes_conns: Vec<String>,
    pub rates_conns: Vec<String>,
    pub thresholds_conns: Vec<String>,
    pub max_iterations: i64,
    pub max_usage: Duration,
}

impl Default for AccountSCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            indexed: IndexedFields::default(),
            attributes_conns: Vec::new(),
            rates_conns: Vec::new(),
            thresholds_conns: Vec::new(),
            max_iterations: 1000,
            max_usage: Duration::from_secs(72 * 3600),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSJson {
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub indexed: IndexedFieldsJson,
    pub attributes_conns: Option<Vec<String>>,
    pub rates_conns: Option<Vec<String>>,
    pub thresholds_conns: Option<Vec<String>>,
    pub max_iterations: Option<i64>,
    pub max_usage: Option<String>,
}

impl Section for AccountSCfg {
    const NAME: &'static str = "accounts";
    type Json = AccountSJson;

    fn load_json(&mut self, jsn: Option<&AccountSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        self.indexed.load_json(&jsn.indexed);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        set_conns(&mut self.rates_conns, &jsn.rates_conns, subsystem::RATES);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        set(&mut self.max_iterations, &jsn.max_iterations);
        set_duration(&mut self.max_usage, &jsn.max_usage)?;
        Ok(())
    }

    fn to_json(&self) -> AccountSJson {
        AccountSJson {
            enabled: Some(self.enabled),
            indexed: self.indexed.to_json(),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
            rates_conns: conns_json(&self.rates_conns, subsystem::RATES),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            max_iterations: Some(self.max_iterations),
            max_usage: duration_json(self.max_usage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;
    use serde_json::json;

    #[test]
    fn test_accounts_contract() {
        let mut sample = AccountSCfg {
            enabled: true,
            attributes_conns: vec!["*internal:*attributes".to_string()],
            rates_conns: vec!["conn1".to_string()],
            max_iterations: 10,
            max_usage: Duration::from_secs(3600),
            ..AccountSCfg::default()
        };
        sample.indexed.string_indexed_fields = Some(vec!["*req.Account".to_string()]);
        sample.indexed.nested_fields = true;
        assert_section_contract(&sample);
    }

    #[test]
    fn test_accounts_flattened_index_fields() {
        let jsn: AccountSJson = serde_json::from_value(json!({
            "enabled": true,
            "indexed_selects": false,
            "prefix_indexed_fields": ["*req.Destination"],
            "thresholds_conns": ["*internal"],
            "max_usage": "259200000000000"
        }))
        .unwrap();
        let mut cfg = AccountSCfg::default();
        cfg.load_json(Some(&jsn)).unwrap();
        assert!(!cfg.indexed.indexed_selects);
        assert_eq!(
            cfg.indexed.prefix_indexed_fields,
            Some(vec!["*req.Destination".to_string()])
        );
        assert_eq!(cfg.thresholds_conns, vec!["*internal:*thresholds".to_string()]);
        assert_eq!(cfg.max_usage, Duration::from_secs(72 * 3600));

        let map = cfg.as_map();
        assert_eq!(map["thresholds_conns"], json!(["*internal"]));
        assert_eq!(map["indexed_selects"], json!(false));
        assert!(!map.contains_key("string_indexed_fields"));
    }
}
