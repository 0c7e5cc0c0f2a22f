//! `diameter_agent` and `radius_agent` sections with their request processors.
//!
//! A request processor matches incoming requests by filters and maps them to
//! session requests through field templates. Processors are identified by
//! `id`: a fragment updates the processor with the same `id` in place and
//! appends the others in order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::conns::{internal_tag, subsystem};
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{conns_json, set, set_conns};

pub const DEFAULT_LAYOUT: &str = "2006-01-02T15:04:05Z07:00";

/// One field mapping of a request or reply.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    pub tag: String,
    pub kind: String,
    pub path: String,
    pub value: String,
    pub mandatory: bool,
    pub filters: Vec<String>,
    pub layout: String,
}

impl Default for FieldTemplate {
    fn default() -> Self {
        Self {
            tag: String::new(),
            kind: String::new(),
            path: String::new(),
            value: String::new(),
            mandatory: false,
            filters: Vec::new(),
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldTemplateJson {
    pub tag: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub path: Option<String>,
    pub value: Option<String>,
    pub mandatory: Option<bool>,
    pub filters: Option<Vec<String>>,
    pub layout: Option<String>,
}

impl FieldTemplate {
    fn from_json(jsn: &FieldTemplateJson) -> Self {
        let mut tpl = Self::default();
        set(&mut tpl.kind, &jsn.kind);
        set(&mut tpl.path, &jsn.path);
        tpl.tag = jsn.tag.clone().unwrap_or_else(|| tpl.path.clone());
        set(&mut tpl.value, &jsn.value);
        set(&mut tpl.mandatory, &jsn.mandatory);
        set(&mut tpl.filters, &jsn.filters);
        set(&mut tpl.layout, &jsn.layout);
        tpl
    }

    fn to_json(&self) -> FieldTemplateJson {
        FieldTemplateJson {
            tag: Some(self.tag.clone()),
            kind: Some(self.kind.clone()),
            path: Some(self.path.clone()),
            value: Some(self.value.clone()),
            mandatory: Some(self.mandatory),
            filters: Some(self.filters.clone()),
            layout: Some(self.layout.clone()),
        }
    }
}

fn templates_from_json(list: &[FieldTemplateJson]) -> Vec<FieldTemplate> {
    list.iter().map(FieldTemplate::from_json).collect()
}

fn templates_json(list: &[FieldTemplate]) -> Option<Vec<FieldTemplateJson>> {
    Some(list.iter().map(FieldTemplate::to_json).collect())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestProcessor {
    pub id: String,
    pub filters: Vec<String>,
    pub tenant: String,
    pub timezone: String,
    pub flags: Vec<String>,
    pub request_fields: Vec<FieldTemplate>,
    pub reply_fields: Vec<FieldTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestProcessorJson {
    pub id: Option<String>,
    pub filters: Option<Vec<String>>,
    pub tenant: Option<String>,
    pub timezone: Option<String>,
    pub flags: Option<Vec<String>>,
    pub request_fields: Option<Vec<FieldTemplateJson>>,
    pub reply_fields: Option<Vec<FieldTemplateJson>>,
}

impl RequestProcessor {
    fn load_json(&mut self, jsn: &RequestProcessorJson) {
        set(&mut self.id, &jsn.id);
        set(&mut self.filters, &jsn.filters);
        set(&mut self.tenant, &jsn.tenant);
        set(&mut self.timezone, &jsn.timezone);
        set(&mut self.flags, &jsn.flags);
        if let Some(fields) = &jsn.request_fields {
            self.request_fields = templates_from_json(fields);
        }
        if let Some(fields) = &jsn.reply_fields {
            self.reply_fields = templates_from_json(fields);
        }
    }

    fn to_json(&self) -> RequestProcessorJson {
        RequestProcessorJson {
            id: (!self.id.is_empty()).then(|| self.id.clone()),
            filters: Some(self.filters.clone()),
            tenant: Some(self.tenant.clone()),
            timezone: Some(self.timezone.clone()),
            flags: Some(self.flags.clone()),
            request_fields: templates_json(&self.request_fields),
            reply_fields: templates_json(&self.reply_fields),
        }
    }
}

/// Update processors with a known `id` in place, append the rest.
/// Processors without an id are always appended.
pub(crate) fn merge_processors(dst: &mut Vec<RequestProcessor>, src: &Option<Vec<RequestProcessorJson>>) {
    let Some(list) = src else {
        return;
    };
    for jsn in list {
        let existing = jsn
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| dst.iter().position(|rp| rp.id == id));
        match existing {
            Some(idx) => dst[idx].load_json(jsn),
            None => {
                let mut rp = RequestProcessor::default();
                rp.load_json(jsn);
                dst.push(rp);
            }
        }
    }
}

fn processors_json(list: &[RequestProcessor]) -> Option<Vec<RequestProcessorJson>> {
    Some(list.iter().map(RequestProcessor::to_json).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiameterAgentCfg {
    pub enabled: bool,
    pub listen: String,
    pub listen_net: String,
    pub dictionaries_path: String,
    pub sessions_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub thresholds_conns: Vec<String>,
    pub origin_host: String,
    pub origin_realm: String,
    pub vendor_id: i64,
    pub product_name: String,
    pub synced_conn_requests: bool,
    pub asr_template: String,
    pub rar_template: String,
    pub forced_disconnect: String,
    pub request_processors: Vec<RequestProcessor>,
}

impl Default for DiameterAgentCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:3868".to_string(),
            listen_net: "tcp".to_string(),
            dictionaries_path: "/usr/share/cgrates/diameter/dict/".to_string(),
            sessions_conns: vec![internal_tag(subsystem::SESSIONS)],
            stats_conns: Vec::new(),
            thresholds_conns: Vec::new(),
            origin_host: "CGR-DA".to_string(),
            origin_realm: "cgrates.org".to_string(),
            vendor_id: 0,
            product_name: "CGRateS".to_string(),
            synced_conn_requests: false,
            asr_template: String::new(),
            rar_template: String::new(),
            forced_disconnect: "*none".to_string(),
            request_processors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiameterAgentJson {
    pub enabled: Option<bool>,
    pub listen: Option<String>,
    pub listen_net: Option<String>,
    pub dictionaries_path: Option<String>,
    pub sessions_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub thresholds_conns: Option<Vec<String>>,
    pub origin_host: Option<String>,
    pub origin_realm: Option<String>,
    pub vendor_id: Option<i64>,
    pub product_name: Option<String>,
    pub synced_conn_requests: Option<bool>,
    pub asr_template: Option<String>,
    pub rar_template: Option<String>,
    pub forced_disconnect: Option<String>,
    pub request_processors: Option<Vec<RequestProcessorJson>>,
}

impl Section for DiameterAgentCfg {
    const NAME: &'static str = "diameter_agent";
    type Json = DiameterAgentJson;

    fn load_json(&mut self, jsn: Option<&DiameterAgentJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set(&mut self.listen, &jsn.listen);
        set(&mut self.listen_net, &jsn.listen_net);
        set(&mut self.dictionaries_path, &jsn.dictionaries_path);
        set_conns(&mut self.sessions_conns, &jsn.sessions_conns, subsystem::SESSIONS);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        set(&mut self.origin_host, &jsn.origin_host);
        set(&mut self.origin_realm, &jsn.origin_realm);
        set(&mut self.vendor_id, &jsn.vendor_id);
        set(&mut self.product_name, &jsn.product_name);
        set(&mut self.synced_conn_requests, &jsn.synced_conn_requests);
        set(&mut self.asr_template, &jsn.asr_template);
        set(&mut self.rar_template, &jsn.rar_template);
        set(&mut self.forced_disconnect, &jsn.forced_disconnect);
        merge_processors(&mut self.request_processors, &jsn.request_processors);
        Ok(())
    }

    fn to_json(&self) -> DiameterAgentJson {
        DiameterAgentJson {
            enabled: Some(self.enabled),
            listen: Some(self.listen.clone()),
            listen_net: Some(self.listen_net.clone()),
            dictionaries_path: Some(self.dictionaries_path.clone()),
            sessions_conns: conns_json(&self.sessions_conns, subsystem::SESSIONS),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            origin_host: Some(self.origin_host.clone()),
            origin_realm: Some(self.origin_realm.clone()),
            vendor_id: Some(self.vendor_id),
            product_name: Some(self.product_name.clone()),
            synced_conn_requests: Some(self.synced_conn_requests),
            asr_template: Some(self.asr_template.clone()),
            rar_template: Some(self.rar_template.clone()),
            forced_disconnect: Some(self.forced_disconnect.clone()),
            request_processors: processors_json(&self.request_processors),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadiusAgentCfg {
    pub enabled: bool,
    pub listen_net: String,
    pub listen_auth: String,
    pub listen_acct: String,
    /// Shared secrets keyed by client address, `*default` for the rest.
    pub client_secrets: BTreeMap<String, String>,
    pub client_dictionaries: BTreeMap<String, Vec<String>>,
    pub sessions_conns: Vec<String>,
    pub stats_conns: Vec<String>,
    pub thresholds_conns: Vec<String>,
    pub request_processors: Vec<RequestProcessor>,
}

impl Default for RadiusAgentCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_net: "udp".to_string(),
            listen_auth: "127.0.0.1:1812".to_string(),
            listen_acct: "127.0.0.1:1813".to_string(),
            client_secrets: BTreeMap::from([("*default".to_string(), "CGRateS.org".to_string())]),
            client_dictionaries: BTreeMap::from([(
                "*default".to_string(),
                vec!["/usr/share/cgrates/radius/dict/".to_string()],
            )]),
            sessions_conns: vec![internal_tag(subsystem::SESSIONS)],
            stats_conns: Vec::new(),
            thresholds_conns: Vec::new(),
            request_processors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiusAgentJson {
    pub enabled: Option<bool>,
    pub listen_net: Option<String>,
    pub listen_auth: Option<String>,
    pub listen_acct: Option<String>,
    pub client_secrets: Option<BTreeMap<String, String>>,
    pub client_dictionaries: Option<BTreeMap<String, Vec<String>>>,
    pub sessions_conns: Option<Vec<String>>,
    pub stats_conns: Option<Vec<String>>,
    pub thresholds_conns: Option<Vec<String>>,
    pub request_processors: Option<Vec<RequestProcessorJson>>,
}

impl Section for RadiusAgentCfg {
    const NAME: &'static str = "radius_agent";
    type Json = RadiusAgentJson;

    fn load_json(&mut self, jsn: Option<&RadiusAgentJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        set(&mut self.enabled, &jsn.enabled);
        set(&mut self.listen_net, &jsn.listen_net);
        set(&mut self.listen_auth, &jsn.listen_auth);
        set(&mut self.listen_acct, &jsn.listen_acct);
        if let Some(secrets) = &jsn.client_secrets {
            self.client_secrets.extend(secrets.clone());
        }
        if let Some(dicts) = &jsn.client_dictionaries {
            self.client_dictionaries.extend(dicts.clone());
        }
        set_conns(&mut self.sessions_conns, &jsn.sessions_conns, subsystem::SESSIONS);
        set_conns(&mut self.stats_conns, &jsn.stats_conns, subsystem::STATS);
        set_conns(&mut self.thresholds_conns, &jsn.thresholds_conns, subsystem::THRESHOLDS);
        merge_processors(&mut self.request_processors, &jsn.request_processors);
        Ok(())
    }

    fn to_json(&self) -> RadiusAgentJson {
        RadiusAgentJson {
            enabled: Some(self.enabled),
            listen_net: Some(self.listen_net.clone()),
            listen_auth: Some(self.listen_auth.clone()),
            listen_acct: Some(self.listen_acct.clone()),
            client_secrets: Some(self.client_secrets.clone()),
            client_dictionaries: Some(self.client_dictionaries.clone()),
            sessions_conns: conns_json(&self.sessions_conns, subsystem::SESSIONS),
            stats_conns: conns_json(&self.stats_conns, subsystem::STATS),
            thresholds_conns: conns_json(&self.thresholds_conns, subsystem::THRESHOLDS),
            request_processors: processors_json(&self.request_processors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::contract::assert_section_contract;
    use serde_json::json;

    fn processor(id: &str) -> RequestProcessor {
        RequestProcessor {
            id: id.to_string(),
            filters: vec!["*string:~*vars.*cmd:CCR".to_string()],
            tenant: "cgrates.org".to_string(),
            flags: vec!["*initiate".to_string(), "*accounts".to_string()],
            request_fields: vec![FieldTemplate {
                tag: "ToR".to_string(),
                kind: "*constant".to_string(),
                path: "*cgreq.ToR".to_string(),
                value: "*voice".to_string(),
                mandatory: true,
                ..FieldTemplate::default()
            }],
            reply_fields: vec![FieldTemplate {
                tag: "ResultCode".to_string(),
                kind: "*constant".to_string(),
                path: "*rep.Result-Code".to_string(),
                value: "2001".to_string(),
                ..FieldTemplate::default()
            }],
            ..RequestProcessor::default()
        }
    }

    #[test]
    fn test_diameter_contract() {
        let sample = DiameterAgentCfg {
            enabled: true,
            listen_net: "sctp".to_string(),
            stats_conns: vec!["*internal:*stats".to_string()],
            vendor_id: 7,
            asr_template: "*asr".to_string(),
            request_processors: vec![processor("init"), processor("term")],
            ..DiameterAgentCfg::default()
        };
        assert_section_contract(&sample);

        let anonymous = DiameterAgentCfg {
            request_processors: vec![processor(""), processor(""), processor("init")],
            ..DiameterAgentCfg::default()
        };
        assert_section_contract(&anonymous);
    }

    #[test]
    fn test_processors_without_id_reload() {
        let jsn: DiameterAgentJson = serde_json::from_value(json!({
            "request_processors": [{"tenant": "a.org"}, {"tenant": "b.org"}]
        }))
        .unwrap();
        let mut cfg = DiameterAgentCfg::default();
        cfg.load_json(Some(&jsn)).unwrap();
        assert_eq!(cfg.request_processors.len(), 2);

        let map = cfg.as_map();
        assert!(map["request_processors"][0].get("id").map_or(true, |id| id.is_null()));
        let reloaded_json: DiameterAgentJson =
            serde_json::from_value(serde_json::Value::Object(map)).unwrap();
        let mut reloaded = DiameterAgentCfg::default();
        reloaded.load_json(Some(&reloaded_json)).unwrap();
        assert_eq!(reloaded, cfg);
        assert_eq!(reloaded.request_processors[0].tenant, "a.org");
        assert_eq!(reloaded.request_processors[1].tenant, "b.org");
    }

    #[test]
    fn test_radius_contract() {
        let mut sample = RadiusAgentCfg {
            enabled: true,
            sessions_conns: vec!["conn1".to_string()],
            request_processors: vec![processor("auth")],
            ..RadiusAgentCfg::default()
        };
        sample
            .client_secrets
            .insert("10.0.0.1".to_string(), "secret".to_string());
        assert_section_contract(&sample);
    }

    #[test]
    fn test_processors_merge_by_id() {
        let mut cfg = DiameterAgentCfg {
            request_processors: vec![processor("init")],
            ..DiameterAgentCfg::default()
        };
        let jsn: DiameterAgentJson = serde_json::from_value(json!({
            "request_processors": [
                {"id": "init", "tenant": "other.org"},
                {"id": "update", "flags": ["*update"]}
            ]
        }))
        .unwrap();
        cfg.load_json(Some(&jsn)).unwrap();

        assert_eq!(cfg.request_processors.len(), 2);
        let init = &cfg.request_processors[0];
        assert_eq!(init.tenant, "other.org");
        assert_eq!(init.request_fields.len(), 1, "fields kept when absent");
        assert_eq!(cfg.request_processors[1].id, "update");
    }

    #[test]
    fn test_template_tag_defaults_to_path() {
        let jsn: FieldTemplateJson =
            serde_json::from_value(json!({"type": "*variable", "path": "*cgreq.Account"})).unwrap();
        let tpl = FieldTemplate::from_json(&jsn);
        assert_eq!(tpl.tag, "*cgreq.Account");
        assert_eq!(tpl.kind, "*variable");
        assert_eq!(tpl.layout, DEFAULT_LAYOUT);
    }

    #[test]
    fn test_sessions_conns_default_renders_internal() {
        let map = DiameterAgentCfg::default().as_map();
        assert_eq!(map["sessions_conns"], json!(["*internal"]));
    }
}
