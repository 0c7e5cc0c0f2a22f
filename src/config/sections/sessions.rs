//! `sessions` section and its nested `stir` block.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::{reject_internal_conns, subsystem};
use crate::config::duration::{format_duration, parse_duration};
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{
    conns_json, duration_json, durations_json, merge_durations, set, set_conns, set_duration,
    set_json, set_set,
};

/// Secure telephone identity (STIR/SHAKEN) verification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StirCfg {
    pub allowed_attest: BTreeSet<String>,
    /// `None` means the payload age is not checked.
    pub payload_maxduration: Option<Duration>,
    pub default_attest: String,
    pub publickey_path: String,
    pub privatekey_path: String,
}

impl Default for StirCfg {
    fn default() -> Self {
        Self {
            allowed_attest: BTreeSet::from(["*any".to_string()]),
            payload_maxduration: Some(Duration::from_secs(60)),
            default_attest: "A".to_string(),
            publickey_path: String::new(),
            privatekey_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StirJson {
    pub allowed_attest: Option<Vec<String>>,
    pub payload_maxduration: Option<String>,
    pub default_attest: Option<String>,
    pub publickey_path: Option<String>,
    pub privatekey_path: Option<String>,
}

impl StirCfg {
    fn load_json(&mut self, jsn: &StirJson) -> Result<(), ConfigError> {
        set_set(&mut self.allowed_attest, &jsn.allowed_attest);
        if let Some(raw) = &jsn.payload_maxduration {
            self.payload_maxduration = match raw.trim() {
                "-1" => None,
                other => Some(parse_duration(other)?),
            };
        }
        set(&mut self.default_attest, &jsn.default_attest);
        set(&mut self.publickey_path, &jsn.publickey_path);
        set(&mut self.privatekey_path, &jsn.privatekey_path);
        Ok(())
    }

    fn to_json(&self) -> StirJson {
        StirJson {
            allowed_attest: set_json(&self.allowed_attest),
            payload_maxduration: Some(match self.payload_maxduration {
                None => "-1".to_string(),
                Some(d) => format_duration(d),
            }),
            default_attest: Some(self.default_attest.clone()),
            publickey_path: Some(self.publickey_path.clone()),
            privatekey_path: Some(self.privatekey_path.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSCfg {
    pub enabled: bool,
    pub listen_bijson: String,
    pub listen_bigob: String,
    pub chargers_conns: Vec<String>,
    pub resources_conns: Vec<String>,
    pub thresholds_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub routes_conns: Vec<String>,
    pub attributes_conns: Vec<String>,
    pub cdrs_conns: Vec<String>,
    pub actions_conns: Vec<String>,
    pub rates_conns: Vec<String>,
    pub accounts_conns: Vec<String>,
    pub replication_conns: Vec<String>,
    pub store_session_costs: bool,
    pub session_indexes: BTreeSet<String>,
    pub client_protocol: f64,
    pub channel_sync_interval: Duration,
    pub terminate_attempts: i64,
    pub alterable_fields: BTreeSet<String>,
    pub min_dur_low_balance: Duration,
    /// Usage assumed when a request carries none, keyed by type of record.
    pub default_usage: BTreeMap<String, Duration>,
    pub stir: StirCfg,
}

impl Default for SessionSCfg {
    fn default() -> Self {
        let default_usage = BTreeMap::from([
            ("*any".to_string(), Duration::from_secs(3 * 3600)),
            ("*voice".to_string(), Duration::from_secs(3 * 3600)),
            ("*data".to_string(), Duration::from_nanos(1_048_576)),
            ("*sms".to_string(), Duration::from_nanos(1)),
        ]);
        Self {
            enabled: false,
            listen_bijson: "127.0.0.1:2014".to_string(),
            listen_bigob: String::new(),
            chargers_conns: Vec::new(),
            resources_conns: Vec::new(),
            thresholds_conns: Vec::new(),
            stats_conns: Vec::new(),
            routes_conns: Vec::new(),
            attributes_conns: Vec::new(),
            cdrs_conns: Vec::new(),
            actions_conns: Vec::new(),
            rates_conns: Vec::new(),
            accounts_conns: Vec::new(),
            replication_conns: Vec::new(),
            store_session_costs: false,
            session_indexes: BTreeSet::new(),
            client_protocol: 2.0,
            channel_sync_interval: Duration::ZERO,
            terminate_attempts: 5,
            alterable_fields: BTreeSet::new(),
            min_dur_low_balance: Duration::ZERO,
            default_usage,
            stir: StirCfg::default(),
        }
    }
}

impl SessionSCfg {
    /// Default usage for a type of record; an empty `tor` means `*any`.
    pub fn default_usage_for(&self, tor: &str) -> Duration {
        let tor = if tor.is_empty() { "*any" } else { tor };
        self.default_usage.get(tor).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSJson {
    pub enabled: Option<bool>,
    pub listen_bijson: Option<String>,
    pub listen_bigob: Option<String>,
    pub chargers_conns: Option<Vec<String>>,
    pub resources_conns: Option<Vec<String>>,
    pub thresholds_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub routes_conns: Option<Vec<String>>,
    pub attributes_conns: Option<Vec<String>>,
    pub cdrs_conns: Option<Vec<String>>,
    pub actions_conns: Option<Vec<String>>,
    pub rates_conns: Option<Vec<String>>,
    pub accounts_conns: Option<Vec<String>>,
    pub replication_conns: Option<Vec<String>>,
    pub store_session_costs: Option<bool>,
    pub session_indexes: Option<Vec<String>>,
    pub client_protocol: Option<f64>,
    pub channel_sync_interval: Option<String>,
    pub terminate_attempts: Option<i64>,
    pub alterable_fields: Option<Vec<String>>,
    pub min_dur_low_balance: Option<String>,
    pub default_usage: Option<BTreeMap<String, String>>,
    pub stir: Option<StirJson>,
}

impl Section for SessionSCfg {
    const NAME: &'static str = "sessions";
    type Json = SessionSJson;

    fn load_json(&mut self, jsn: Option<&SessionSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set(&mut self.listen_bijson, &jsn.listen_bijson);
        set(&mut self.listen_bigob, &jsn.listen_bigob);
        set_conns(&mut self.chargers_conns, &jsn.chargers_conns, subsystem::CHARGERS);
        set_conns(&mut self.resources_conns, &jsn.resources_conns, subsystem::RESOURCES);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.routes_conns, &jsn.routes_conns, subsystem::ROUTES);
        set_conns(&mut self.attributes_conns, &jsn.attributes_conns, subsystem::ATTRIBUTES);
        set_conns(&mut self.cdrs_conns, &jsn.cdrs_conns, subsystem::CDRS);
        set_conns(&mut self.actions_conns, &jsn.actions_conns, subsystem::ACTIONS);
        set_conns(&mut self.rates_conns, &jsn.rates_conns, subsystem::RATES);
        set_conns(&mut self.accounts_conns, &jsn.accounts_conns, subsystem::ACCOUNTS);
        if let Some(ids) = &jsn.replication_conns {
            self.replication_conns = reject_internal_conns(ids, "Replication")?;
        }
        set(&mut self.store_session_costs, &jsn.store_session_costs);
        set_set(&mut self.session_indexes, &jsn.session_indexes);
        set(&mut self.client_protocol, &jsn.client_protocol);
        set_duration(&mut self.channel_sync_interval, &jsn.channel_sync_interval)?;
        set(&mut self.terminate_attempts, &jsn.terminate_attempts);
        set_set(&mut self.alterable_fields, &jsn.alterable_fields);
        set_duration(&mut self.min_dur_low_balance, &jsn.min_dur_low_balance)?;
        merge_durations(&mut self.default_usage, &jsn.default_usage)?;
        if let Some(stir) = &jsn.stir {
            self.stir.load_json(stir)?;
        }
        Ok(())
    }

    fn to_json(&self) -> SessionSJson {
        SessionSJson {
            enabled: Some(self.enabled),
            listen_bijson: Some(self.listen_bijson.clone()),
            listen_bigob: Some(self.listen_bigob.clone()),
            chargers_conns: conns_json(&self.chargers_conns, subsystem::CHARGERS),
            resources_conns: conns_json(&self.resources_conns, subsystem::RESOURCES),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            routes_conns: conns_json(&self.routes_conns, subsystem::ROUTES),
            attributes_conns: conns_json(&self.attributes_conns, subsystem::ATTRIBUTES),
            cdrs_conns: conns_json(&self.cdrs_conns, subsystem::CDRS),
            actions_conns: conns_json(&self.actions_conns, subsystem::ACTIONS),
            rates_conns: conns_json(&self.rates_conns, subsystem::RATES),
            accounts_conns: conns_json(&self.accounts_conns, subsystem::ACCOUNTS),
            replication_conns: Some(self.replication_conns.clone()),
            store_session_costs: Some(self.store_session_costs),
            session_indexes: set_json(&self.session_indexes),
            client_protocol: Some(self.client_protocol),
            channel_sync_interval: duration_json(self.channel_sync_interval),
            terminate_attempts: Some(self.terminate_attempts),
            alterable_fields: set_json(&self.alterable_fields),
            min_dur_low_balance: duration_json(self.min_dur_low_balance),
            default_usage: durations_json(&self.default_usage),
            stir: Some(self.stir.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::diff::diff_section;
    use crate::config::sections::contract::assert_section_contract;
    use serde_json::json;

    fn load(value: serde_json::Value) -> Result<SessionSCfg, ConfigError> {
        let jsn: SessionSJson = serde_json::from_value(value).unwrap();
        let mut cfg = SessionSCfg::default();
        cfg.load_json(Some(&jsn))?;
        Ok(cfg)
    }

    fn sample() -> SessionSCfg {
        let mut cfg = SessionSCfg {
            enabled: true,
            chargers_conns: vec!["*internal:*chargers".to_string()],
            cdrs_conns: vec!["*internal:*cdrs".to_string()],
            stats_conns: vec!["conn1".to_string()],
            replication_conns: vec!["rpl1".to_string()],
            store_session_costs: true,
            session_indexes: BTreeSet::from(["OriginID".to_string()]),
            channel_sync_interval: Duration::from_secs(10),
            alterable_fields: BTreeSet::from(["Extra1".to_string(), "Extra2".to_string()]),
            min_dur_low_balance: Duration::from_secs(5),
            ..SessionSCfg::default()
        };
        cfg.default_usage.insert("*voice".to_string(), Duration::from_secs(60));
        cfg.stir.payload_maxduration = None;
        cfg.stir.allowed_attest = BTreeSet::from(["A".to_string(), "B".to_string()]);
        cfg
    }

    #[test]
    fn test_sessions_contract() {
        assert_section_contract(&sample());
    }

    #[test]
    fn test_sessions_load() {
        let cfg = load(json!({
            "enabled": true,
            "chargers_conns": ["*internal"],
            "session_indexes": ["OriginHost", "OriginID", "OriginID"],
            "default_usage": {"*voice": "1m"},
            "stir": {"payload_maxduration": "-1", "default_attest": "B"}
        }))
        .unwrap();
        assert_eq!(cfg.chargers_conns, vec!["*internal:*chargers".to_string()]);
        assert_eq!(cfg.session_indexes.len(), 2);
        assert_eq!(cfg.default_usage_for("*voice"), Duration::from_secs(60));
        assert_eq!(cfg.default_usage_for(""), Duration::from_secs(3 * 3600));
        assert_eq!(cfg.stir.payload_maxduration, None);
        assert_eq!(cfg.stir.default_attest, "B");
        assert_eq!(cfg.stir.allowed_attest.len(), 1);
    }

    #[test]
    fn test_sessions_replication_rejects_internal() {
        let err = load(json!({"replication_conns": ["rpl", "*internal"]})).unwrap_err();
        assert!(matches!(err, ConfigError::InternalConnNotAllowed("Replication")));
    }

    #[test]
    fn test_sessions_bad_durations() {
        assert!(matches!(
            load(json!({"channel_sync_interval": "1y"})),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            load(json!({"default_usage": {"*data": "lots"}})),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            load(json!({"stir": {"payload_maxduration": "-5s"}})),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_default_usage_diff_only_changed_keys() {
        let v1 = SessionSCfg::default();
        let mut v2 = v1.clone();
        v2.default_usage.insert("*data".to_string(), Duration::from_nanos(2048));
        v2.stir.default_attest = "C".to_string();
        let patch = diff_section(SessionSJson::default(), &v1, &v2).unwrap();
        assert_eq!(
            patch,
            SessionSJson {
                default_usage: Some(BTreeMap::from([("*data".to_string(), "2048".to_string())])),
                stir: Some(StirJson {
                    default_attest: Some("C".to_string()),
                    ..StirJson::default()
                }),
                ..SessionSJson::default()
            }
        );
    }

    #[test]
    fn test_diff_keeps_stored_fields() {
        let stored = SessionSJson {
            listen_bigob: Some(":2015".to_string()),
            ..SessionSJson::default()
        };
        let v1 = SessionSCfg::default();
        let v2 = SessionSCfg {
            terminate_attempts: 9,
            ..v1.clone()
        };
        let patch = diff_section(stored, &v1, &v2).unwrap();
        assert_eq!(patch.listen_bigob.as_deref(), Some(":2015"));
        assert_eq!(patch.terminate_attempts, Some(9));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        copy.session_indexes.clear();
        copy.default_usage.clear();
        copy.stir.allowed_attest.insert("C".to_string());
        assert_eq!(original, sample());
    }
}
