//! `listen` section: addresses of the engine's own RPC and HTTP listeners.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::set;

#[derive(Debug, Clone, PartialEq)]
pub struct ListenCfg {
    pub rpc_json: String,
    pub rpc_gob: String,
    pub http: String,
    pub rpc_json_tls: String,
    pub rpc_gob_tls: String,
    pub http_tls: String,
}

impl Default for ListenCfg {
    fn default() -> Self {
        Self {
            rpc_json: "127.0.0.1:2012".to_string(),
            rpc_gob: "127.0.0.1:2013".to_string(),
            http: "127.0.0.1:2080".to_string(),
            rpc_json_tls: String::new(),
            rpc_gob_tls: String::new(),
            http_tls: String::new(),
        }
    }
}

impl ListenCfg {
    /// Whether any TLS listener has an address. TLS listeners are off by default.
    pub fn has_tls_listener(&self) -> bool {
        [&self.rpc_json_tls, &self.rpc_gob_tls, &self.http_tls]
            .iter()
            .any(|addr| !addr.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListenJson {
    pub rpc_json: Option<String>,
    pub rpc_gob: Option<String>,
    pub http: Option<String>,
    pub rpc_json_tls: Option<String>,
    pub rpc_gob_tls: Option<String>,
    pub http_tls: Option<String>,
}

impl Section for ListenCfg {
    const NAME: &'static str = "listen";
    type Json = ListenJson;

    fn load_json(&mut self, jsn: Option<&ListenJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.rpc_json, &jsn.rpc_json);
        set(&mut self.rpc_gob, &jsn.rpc_gob);
        set(&mut self.http, &jsn.http);
        set(&mut self.rpc_json_tls, &jsn.rpc_json_tls);
        set(&mut self.rpc_gob_tls, &jsn.rpc_gob_tls);
        set(&mut self.http_tls, &jsn.http_tls);
        Ok(())
    }

    fn to_json(&self) -> ListenJson {
        ListenJson {
            rpc_json: Some(self.rpc_json.clone()),
            rpc_gob: Some(self.rpc_gob.clone()),
            http: Some(self.http.clone()),
            rpc_json_tls: Some(self.rpc_json_tls.clone()),
            rpc_gob_tls: Some(self.rpc_gob_tls.clone()),
            http_tls: Some(self.http_tls.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;

    #[test]
    fn test_listen_contract() {
        assert_section_contract(&ListenCfg {
            rpc_json: ":3012".to_string(),
            http_tls: "127.0.0.1:2280".to_string(),
            ..ListenCfg::default()
        });
    }

    #[test]
    fn test_has_tls_listener() {
        let mut cfg = ListenCfg::default();
        assert!(!cfg.has_tls_listener());
        cfg.rpc_gob_tls = "127.0.0.1:2023".to_string();
        assert!(cfg.has_tls_listener());
    }
}
