//! `cdrs` section: charging data record server.

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns};

#[derive(Debug, Clone, PartialEq)]
pub struct CdrsCfg {
    pub enabled: bool,
    pub extra_fields: Vec<String>,
    pub store_cdrs: bool,
    pub session_cost_retries: i64,
    pub chargers_conns: Vec<String>,
    pub attributes_conns: Vec<String>,
    pub thresholds_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub actions_conns: Vec<String>,
    pub ees_conns: Vec<String>,
    pub online_cdr_exports: Vec<String>,
}

impl Default for CdrsCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            extra_fields: Vec::new(),
            store_cdrs: true,
            session_cost_retries: 5,
            chargers_conns: Vec::new(),
            attributes_conns: Vec::new(),
            thresholds_conns: Vec::new(),
            stats_conns: Vec::new(),
            actions_conns: Vec::new(),
            ees_conns: Vec::new(),
            online_cdr_exports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdrsJson {
    pub enabled: Option<bool>,
    pub extra_fields: Option<Vec<String>>,
    pub store_cdrs: Option<bool>,
    pub session_cost_retries: Option<i64>,
    pub chargers_conns: Option<Vec<String>>,
    pub attributes_conns: Option<Vec<String>>,
    pub thresholds_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub actions_conns: Option<Vec<String>>,
    pub ees_conns: Option<Vec<String>>,
    pub online_cdr_exports: Option<Vec<String>>,
}

impl Section for CdrsCfg {
    const NAME: &'static str = "cdrs";
    type Json = CdrsJson;

    fn load_json(&mut self, jsn: Option<&CdrsJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set(&mut self.extra_fields, &jsn.extra_fields);
        set(&mut self.store_cdrs, &jsn.store_cdrs);
        set(&mut self.session_cost_retries, &jsn.session_cost_retries);
        set_conns(&mut self.chargers_conns, &jsn.chargers_conns, subsystem::CHARGERS);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.actions_conns, &jsn.actions_conns, subsystem::ACTIONS);
        set_conns(&mut self.ees_conns, &jsn.ees_conns, subsystem::EES);
        set(&mut self.online_cdr_exports, &jsn.online_cdr_exports);
        Ok(())
    }

    fn to_json(&self) -> CdrsJson {
        CdrsJson {
            enabled: Some(self.enabled),
            extra_fields: Some(self.extra_fields.clone()),
            store_cdrs: Some(self.store_cdrs),
            session_cost_retries: Some(self.session_cost_retries),
            chargers_conns: conns_json(&self.chargers_conns, subsystem::CHARGERS),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            actions_conns: conns_json(&self.actions_conns, subsystem::ACTIONS),
            ees_conns: conns_json(&self.ees_conns, subsystem::EES),
            online_cdr_exports: Some(self.online_cdr_exports.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;

    #[test]
    fn test_cdrs_contract() {
        let sample = CdrsCfg {
            enabled: true,
            extra_fields: vec!["PayPalAccount".to_string(), "LCRProfile".to_string()],
            store_cdrs: false,
            session_cost_retries: 9,
            chargers_conns: vec!["*internal:*chargers".to_string()],
            ees_conns: vec!["conn1".to_string()],
            online_cdr_exports: vec!["http_localhost".to_string()],
            ..CdrsCfg::default()
        };
        assert_section_contract(&sample);
    }

    #[test]
    fn test_cdrs_explicit_empty_list_clears() {
        let mut cfg = CdrsCfg {
            extra_fields: vec!["X".to_string()],
            ..CdrsCfg::default()
        };
        let jsn = CdrsJson {
            extra_fields: Some(Vec::new()),
            ..CdrsJson::default()
        };
        cfg.load_json(Some(&jsn)).unwrap();
        assert!(cfg.extra_fields.is_empty());
    }
}
