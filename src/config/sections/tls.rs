//! `tls` section: certificates used by the TLS listeners and outgoing clients.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::set;

#[derive(Debug, Clone, PartialEq)]
pub struct TlsCfg {
    pub server_certificate: String,
    pub server_key: String,
    pub ca_certificate: String,
    pub client_certificate: String,
    pub client_key: String,
    pub server_name: String,
    /// Client authentication policy, `0..=4`.
    pub server_policy: i64,
}

impl Default for TlsCfg {
    fn default() -> Self {
        Self {
            server_certificate: String::new(),
            server_key: String::new(),
            ca_certificate: String::new(),
            client_certificate: String::new(),
            client_key: String::new(),
            server_name: String::new(),
            server_policy: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsJson {
    pub server_certificate: Option<String>,
    pub server_key: Option<String>,
    pub ca_certificate: Option<String>,
    pub client_certificate: Option<String>,
    pub client_key: Option<String>,
    pub server_name: Option<String>,
    pub server_policy: Option<i64>,
}

impl Section for TlsCfg {
    const NAME: &'static str = "tls";
    type Json = TlsJson;

    fn load_json(&mut self, jsn: Option<&TlsJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.server_certificate, &jsn.server_certificate);
        set(&mut self.server_key, &jsn.server_key);
        set(&mut self.ca_certificate, &jsn.ca_certificate);
        set(&mut self.client_certificate, &jsn.client_certificate);
        set(&mut self.client_key, &jsn.client_key);
        set(&mut self.server_name, &jsn.server_name);
        set(&mut self.server_policy, &jsn.server_policy);
        Ok(())
    }

    fn to_json(&self) -> TlsJson {
        TlsJson {
            server_certificate: Some(self.server_certificate.clone()),
            server_key: Some(self.server_key.clone()),
            ca_certificate: Some(self.ca_certificate.clone()),
            client_certificate: Some(self.client_certificate.clone()),
            client_key: Some(self.client_key.clone()),
            server_name: Some(self.server_name.clone()),
            server_policy: Some(self.server_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;

    #[test]
    fn test_tls_contract() {
        assert_section_contract(&TlsCfg {
            server_certificate: "/etc/ocs/server.crt".to_string(),
            server_key: "/etc/ocs/server.key".to_string(),
            server_name: "ocs.example.org".to_string(),
            server_policy: 2,
            ..TlsCfg::default()
        });
    }
}
