//! `cores` section: request concurrency caps.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{duration_json, set, set_duration};

pub const CAPS_STRATEGIES: &[&str] = &["*busy", "*queue"];

#[derive(Debug, Clone, PartialEq)]
pub struct CoreSCfg {
    /// Maximum concurrent requests, `0` disables the cap.
    pub caps: i64,
    pub caps_strategy: String,
    pub caps_stats_interval: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for CoreSCfg {
    fn default() -> Self {
        Self {
            caps: 0,
            caps_strategy: "*busy".to_string(),
            caps_stats_interval: Duration::ZERO,
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreSJson {
    pub caps: Option<i64>,
    pub caps_strategy: Option<String>,
    pub caps_stats_interval: Option<String>,
    pub shutdown_timeout: Option<String>,
}

impl Section for CoreSCfg {
    const NAME: &'static str = "cores";
    type Json = CoreSJson;

    fn load_json(&mut self, jsn: Option<&CoreSJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.caps, &jsn.caps);
        set(&mut self.caps_strategy, &jsn.caps_strategy);
        set_duration(&mut self.caps_stats_interval, &jsn.caps_stats_interval)?;
        set_duration(&mut self.shutdown_timeout, &jsn.shutdown_timeout)?;
        Ok(())
    }

    fn to_json(&self) -> CoreSJson {
        CoreSJson {
            caps: Some(self.caps),
            caps_strategy: Some(self.caps_strategy.clone()),
            caps_stats_interval: duration_json(self.caps_stats_interval),
            shutdown_timeout: duration_json(self.shutdown_timeout),
        }
    }
}
