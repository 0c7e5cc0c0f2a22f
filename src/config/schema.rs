//! Root configuration aggregate.
//!
//! `ChargingConfig` holds one typed value per section. `Default` is the
//! built-in configuration, which documents are layered on top of.

use serde_json::{Map, Value};

use crate::config::error::ConfigError;
use crate::config::section::{DynSection, Section};
use crate::config::sections::{
    AccountSCfg, AdminSCfg, AttributeSCfg, CdrsCfg, ChargerSCfg, CoreSCfg, DataDbCfg,
    DiameterAgentCfg, GeneralCfg, ListenCfg, RadiusAgentCfg, RalSCfg, ResourceSCfg, RouteSCfg,
    RpcConnsCfg, SessionSCfg, StatSCfg, StorDbCfg, ThresholdSCfg, TlsCfg,
};

/// Every section key in load order.
pub const SECTION_NAMES: &[&str] = &[
    GeneralCfg::NAME,
    ListenCfg::NAME,
    TlsCfg::NAME,
    DataDbCfg::NAME,
    StorDbCfg::NAME,
    RpcConnsCfg::NAME,
    CoreSCfg::NAME,
    AdminSCfg::NAME,
    AccountSCfg::NAME,
    AttributeSCfg::NAME,
    ChargerSCfg::NAME,
    ResourceSCfg::NAME,
    ThresholdSCfg::NAME,
    StatSCfg::NAME,
    RouteSCfg::NAME,
    RalSCfg::NAME,
    CdrsCfg::NAME,
    SessionSCfg::NAME,
    DiameterAgentCfg::NAME,
    RadiusAgentCfg::NAME,
];

/// Selector meaning "every section".
pub const ALL_SECTIONS: &str = "*all";

/// Root configuration of the charging engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargingConfig {
    pub general: GeneralCfg,
    pub listen: ListenCfg,
    pub tls: TlsCfg,
    pub data_db: DataDbCfg,
    pub stor_db: StorDbCfg,
    pub rpc_conns: RpcConnsCfg,
    pub cores: CoreSCfg,
    pub admins: AdminSCfg,
    pub accounts: AccountSCfg,
    pub attributes: AttributeSCfg,
    pub chargers: ChargerSCfg,
    pub resources: ResourceSCfg,
    pub thresholds: ThresholdSCfg,
    pub stats: StatSCfg,
    pub routes: RouteSCfg,
    pub rals: RalSCfg,
    pub cdrs: CdrsCfg,
    pub sessions: SessionSCfg,
    pub diameter_agent: DiameterAgentCfg,
    pub radius_agent: RadiusAgentCfg,
}

impl ChargingConfig {
    /// Built-in defaults with `doc` layered on top.
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.load_document(doc)?;
        Ok(cfg)
    }

    pub fn section_names() -> &'static [&'static str] {
        SECTION_NAMES
    }

    pub fn section(&self, name: &str) -> Option<&dyn DynSection> {
        let section: &dyn DynSection = match name {
            "general" => &self.general,
            "listen" => &self.listen,
            "tls" => &self.tls,
            "data_db" => &self.data_db,
            "stor_db" => &self.stor_db,
            "rpc_conns" => &self.rpc_conns,
            "cores" => &self.cores,
            "admins" => &self.admins,
            "accounts" => &self.accounts,
            "attributes" => &self.attributes,
            "chargers" => &self.chargers,
            "resources" => &self.resources,
            "thresholds" => &self.thresholds,
            "stats" => &self.stats,
            "routes" => &self.routes,
            "rals" => &self.rals,
            "cdrs" => &self.cdrs,
            "sessions" => &self.sessions,
            "diameter_agent" => &self.diameter_agent,
            "radius_agent" => &self.radius_agent,
            _ => return None,
        };
        Some(section)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut dyn DynSection> {
        let section: &mut dyn DynSection = match name {
            "general" => &mut self.general,
            "listen" => &mut self.listen,
            "tls" => &mut self.tls,
            "data_db" => &mut self.data_db,
            "stor_db" => &mut self.stor_db,
            "rpc_conns" => &mut self.rpc_conns,
            "cores" => &mut self.cores,
            "admins" => &mut self.admins,
            "accounts" => &mut self.accounts,
            "attributes" => &mut self.attributes,
            "chargers" => &mut self.chargers,
            "resources" => &mut self.resources,
            "thresholds" => &mut self.thresholds,
            "stats" => &mut self.stats,
            "routes" => &mut self.routes,
            "rals" => &mut self.rals,
            "cdrs" => &mut self.cdrs,
            "sessions" => &mut self.sessions,
            "diameter_agent" => &mut self.diameter_agent,
            "radius_agent" => &mut self.radius_agent,
            _ => return None,
        };
        Some(section)
    }

    /// Layer every known section present in `doc`. Unknown keys are logged and skipped.
    pub fn load_document(&mut self, doc: &Map<String, Value>) -> Result<(), ConfigError> {
        self.load_sections(doc, SECTION_NAMES)?;
        for key in doc.keys() {
            if !SECTION_NAMES.contains(&key.as_str()) {
                tracing::warn!(section = %key, "Ignoring unknown configuration section");
            }
        }
        Ok(())
    }

    /// Layer the sections of `doc` named in `only`, in load order.
    pub fn load_sections(&mut self, doc: &Map<String, Value>, only: &[&str]) -> Result<(), ConfigError> {
        for name in SECTION_NAMES.iter().filter(|name| only.contains(*name)) {
            let Some(value) = doc.get(*name) else {
                continue;
            };
            if let Some(section) = self.section_mut(name) {
                section.load_value(value).map_err(|e| {
                    tracing::error!(section = %name, error = %e, "Failed to load section");
                    e
                })?;
            }
        }
        Ok(())
    }

    pub fn section_as_map(&self, name: &str) -> Result<Value, ConfigError> {
        self.section(name)
            .map(|s| s.as_map_value())
            .ok_or_else(|| ConfigError::InvalidSection(name.to_string()))
    }

    /// Per-section patches turning `self` into `other`. Unchanged sections are omitted.
    pub fn diff(&self, other: &ChargingConfig, sections: &[&str]) -> Result<Map<String, Value>, ConfigError> {
        let mut out = Map::new();
        for name in sections {
            let (Some(old), Some(new)) = (self.section(name), other.section(name)) else {
                return Err(ConfigError::InvalidSection(name.to_string()));
            };
            let patch = old.diff_value(Value::Null, new)?;
            if patch.as_object().is_some_and(|fields| !fields.is_empty()) {
                out.insert(name.to_string(), patch);
            }
        }
        Ok(out)
    }

    /// Every section keyed by name.
    pub fn as_map(&self) -> Map<String, Value> {
        SECTION_NAMES
            .iter()
            .filter_map(|name| self.section(name).map(|s| (name.to_string(), s.as_map_value())))
            .collect()
    }
}

/// Expand a section selector. Empty or `*all` selects everything.
pub fn resolve_sections(requested: &[String]) -> Result<Vec<&'static str>, ConfigError> {
    if requested.is_empty() || requested.iter().any(|s| s == ALL_SECTIONS) {
        return Ok(SECTION_NAMES.to_vec());
    }
    requested
        .iter()
        .map(|name| {
            SECTION_NAMES
                .iter()
                .copied()
                .find(|known| *known == name.as_str())
                .ok_or_else(|| ConfigError::InvalidSection(name.clone()))
        })
        .collect()
}
