//! `admins` section: the administrative API service.

use serde::{Deserialize, Serialize};

use crate::config::conns::{internal_tag, subsystem};
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns};

#[derive(Debug, Clone, PartialEq)]
pub struct AdminSCfg {
    pub enabled: bool,
    pub caches_conns: Vec<String>,
    pub actions_conns: Vec<String>,
    pub attributes_conns: Vec<String>,
    pub ees_conns: Vec<String>,
}

impl Default for AdminSCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            caches_conns: vec![internal_tag(subsystem::CACHES)],
            actions_conns: Vec::new(),
            attributes_conns: Vec::new(),
            ees_conns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminSJson {
    pub enabled: Option<bool>,
    pub caches_conns: Option<Vec<String>>,
    pub actions_conns: Option<Vec<String>>,
    pub attributes_conns: Option<Vec<String>>,
    pub ees_conns: Option<Vec<String>>,
}

impl Section for AdminSCfg {
    const NAME: &'static str = "admins";
    type Json = AdminSJson;

    fn load_json(&mut self, jsn: Option<&AdminSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set_conns(&mut self.caches_conns, &jsn.caches_conns, subsystem::CACHES);
        set_conns(&mut self.actions_conns, &jsn.actions_conns, subsystem::ACTIONS);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        set_conns(&mut self.ees_conns, &jsn.ees_conns, subsystem::EES);
        Ok(())
    }

    fn to_json(&self) -> AdminSJson {
        AdminSJson {
            enabled: Some(self.enabled),
            caches_conns: conns_json(&self.caches_conns, subsystem::CACHES),
            actions_conns: conns_json(&self.actions_conns, subsystem::ACTIONS),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
            ees_conns: conns_json(&self.ees_conns, subsystem::EES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;

    #[test]
    fn test_admins_contract() {
        assert_section_contract(&AdminSCfg {
            enabled: true,
            caches_conns: vec!["conn1".to_string()],
            actions_conns: vec!["*internal:*actions".to_string()],
            attributes_conns: vec!["*internal:*attributes".to_string(), "conn2".to_string()],
            ees_conns: Vec::new(),
        });
    }

    #[test]
    fn test_admins_default_caches_conn_renders_untagged() {
        let map = AdminSCfg::default().as_map();
        assert_eq!(map["caches_conns"], serde_json::json!(["*internal"]));
    }
}
