//! `rals` section: rating and accounting limits per type of record.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::subsystem;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, durations_json, merge_durations, set, set_conns};

#[derive(Debug, Clone, PartialEq)]
pub struct RalSCfg {
    pub enabled: bool,
    pub thresholds_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub rp_subject_prefix_matching: bool,
    pub remove_expired: bool,
    /// Keyed by type of record (`*any`, `*voice`, `*data`, ...).
    pub max_computed_usage: BTreeMap<String, Duration>,
    pub max_increments: i64,
    pub balance_rating_subject: BTreeMap<String, String>,
}

impl Default for RalSCfg {
    fn default() -> Self {
        let max_computed_usage = BTreeMap::from([
            ("*any".to_string(), Duration::from_secs(189 * 3600)),
            ("*voice".to_string(), Duration::from_secs(72 * 3600)),
            ("*data".to_string(), Duration::from_nanos(107_374_182_400)),
            ("*sms".to_string(), Duration::from_nanos(10_000)),
            ("*mms".to_string(), Duration::from_nanos(10_000)),
        ]);
        let balance_rating_subject = BTreeMap::from([
            ("*any".to_string(), "*zero1ns".to_string()),
            ("*voice".to_string(), "*zero1s".to_string()),
        ]);
        Self {
            enabled: false,
            thresholds_conns: Vec::new(),
            stats_conns: Vec::new(),
            rp_subject_prefix_matching: false,
            remove_expired: true,
            max_computed_usage,
            max_increments: 1_000_000,
            balance_rating_subject,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RalSJson {
    pub enabled: Option<bool>,
    pub thresholds_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub rp_subject_prefix_matching: Option<bool>,
    pub remove_expired: Option<bool>,
    pub max_computed_usage: Option<BTreeMap<String, String>>,
    pub max_increments: Option<i64>,
    pub balance_rating_subject: Option<BTreeMap<String, String>>,
}

impl Section for RalSCfg {
    const NAME: &'static str = "rals";
    type Json = RalSJson;

    fn load_json(&mut self, jsn: Option<&RalSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set(&mut self.rp_subject_prefix_matching, &jsn.rp_subject_prefix_matching);
        set(&mut self.remove_expired, &jsn.remove_expired);
        merge_durations(&mut self.max_computed_usage, &jsn.max_computed_usage)?;
        set(&mut self.max_increments, &jsn.max_increments);
        if let Some(subjects) = &jsn.balance_rating_subject {
            self.balance_rating_subject.extend(subjects.clone());
        }
        Ok(())
    }

    fn to_json(&self) -> RalSJson {
        RalSJson {
            enabled: Some(self.enabled),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            rp_subject_prefix_matching: Some(self.rp_subject_prefix_matching),
            remove_expired: Some(self.remove_expired),
            max_computed_usage: durations_json(&self.max_computed_usage),
            max_increments: Some(self.max_increments),
            balance_rating_subject: Some(self.balance_rating_subject.clone()),
        }
    }
}
