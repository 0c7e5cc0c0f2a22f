//! `general` section: node identity, defaults applied to incoming requests and
//! connection tuning shared by every internal client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{duration_json, set, set_duration};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralCfg {
    pub node_id: String,
    pub log_level: i64,
    pub rounding_decimals: i64,
    /// Stored without the leading `*`.
    pub dbdata_encoding: String,
    pub tpexport_dir: String,
    pub default_request_type: String,
    pub default_category: String,
    pub default_tenant: String,
    pub default_timezone: String,
    pub default_caching: String,
    pub connect_attempts: i64,
    /// `-1` reconnects forever.
    pub reconnects: i64,
    pub max_reconnect_interval: Duration,
    pub connect_timeout: Duration,
    pub reply_timeout: Duration,
    pub locking_timeout: Duration,
    pub digest_separator: String,
    pub digest_equal: String,
    pub max_parallel_conns: i64,
}

impl Default for GeneralCfg {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            log_level: 6,
            rounding_decimals: 5,
            dbdata_encoding: "msgpack".to_string(),
            tpexport_dir: "/var/spool/cgrates/tpe".to_string(),
            default_request_type: "*rated".to_string(),
            default_category: "call".to_string(),
            default_tenant: "cgrates.org".to_string(),
            default_timezone: "Local".to_string(),
            default_caching: "*reload".to_string(),
            connect_attempts: 5,
            reconnects: -1,
            max_reconnect_interval: Duration::ZERO,
            connect_timeout: Duration::from_secs(1),
            reply_timeout: Duration::from_secs(2),
            locking_timeout: Duration::ZERO,
            digest_separator: ",".to_string(),
            digest_equal: ":".to_string(),
            max_parallel_conns: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralJson {
    pub node_id: Option<String>,
    pub log_level: Option<i64>,
    pub rounding_decimals: Option<i64>,
    pub dbdata_encoding: Option<String>,
    pub tpexport_dir: Option<String>,
    pub default_request_type: Option<String>,
    pub default_category: Option<String>,
    pub default_tenant: Option<String>,
    pub default_timezone: Option<String>,
    pub default_caching: Option<String>,
    pub connect_attempts: Option<i64>,
    pub reconnects: Option<i64>,
    pub max_reconnect_interval: Option<String>,
    pub connect_timeout: Option<String>,
    pub reply_timeout: Option<String>,
    pub locking_timeout: Option<String>,
    pub digest_separator: Option<String>,
    pub digest_equal: Option<String>,
    pub max_parallel_conns: Option<i64>,
}

impl Section for GeneralCfg {
    const NAME: &'static str = "general";
    type Json = GeneralJson;

    fn load_json(&mut self, jsn: Option<&GeneralJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.node_id, &jsn.node_id);
        set(&mut self.log_level, &jsn.log_level);
        set(&mut self.rounding_decimals, &jsn.rounding_decimals);
        if let Some(enc) = &jsn.dbdata_encoding {
            self.dbdata_encoding = enc.trim_start_matches('*').to_string();
        }
        set(&mut self.tpexport_dir, &jsn.tpexport_dir);
        set(&mut self.default_request_type, &jsn.default_request_type);
        set(&mut self.default_category, &jsn.default_category);
        set(&mut self.default_tenant, &jsn.default_tenant);
        set(&mut self.default_timezone, &jsn.default_timezone);
        set(&mut self.default_caching, &jsn.default_caching);
        set(&mut self.connect_attempts, &jsn.connect_attempts);
        set(&mut self.reconnects, &jsn.reconnects);
        set_duration(&mut self.max_reconnect_interval, &jsn.max_reconnect_interval)?;
        set_duration(&mut self.connect_timeout, &jsn.connect_timeout)?;
        set_duration(&mut self.reply_timeout, &jsn.reply_timeout)?;
        set_duration(&mut self.locking_timeout, &jsn.locking_timeout)?;
        set(&mut self.digest_separator, &jsn.digest_separator);
        set(&mut self.digest_equal, &jsn.digest_equal);
        set(&mut self.max_parallel_conns, &jsn.max_parallel_conns);
        Ok(())
    }

    fn to_json(&self) -> GeneralJson {
        GeneralJson {
            node_id: Some(self.node_id.clone()),
            log_level: Some(self.log_level),
            rounding_decimals: Some(self.rounding_decimals),
            dbdata_encoding: Some(format!("*{}", self.dbdata_encoding)),
            tpexport_dir: Some(self.tpexport_dir.clone()),
            default_request_type: Some(self.default_request_type.clone()),
            default_category: Some(self.default_category.clone()),
            default_tenant: Some(self.default_tenant.clone()),
            default_timezone: Some(self.default_timezone.clone()),
            default_caching: Some(self.default_caching.clone()),
            connect_attempts: Some(self.connect_attempts),
            reconnects: Some(self.reconnects),
            max_reconnect_interval: duration_json(self.max_reconnect_interval),
            connect_timeout: duration_json(self.connect_timeout),
            reply_timeout: duration_json(self.reply_timeout),
            locking_timeout: duration_json(self.locking_timeout),
            digest_separator: Some(self.digest_separator.clone()),
            digest_equal: Some(self.digest_equal.clone()),
            max_parallel_conns: Some(self.max_parallel_conns),
        }
    }
}
