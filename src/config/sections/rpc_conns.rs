//! `rpc_conns` section: named connection pools other sections refer to.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::META_LOCALHOST;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{duration_json, set, set_duration};

pub const POOL_STRATEGIES: &[&str] = &[
    "*first",
    "*next",
    "*random",
    "*first_positive",
    "*first_positive_async",
    "*broadcast",
    "*broadcast_sync",
    "*broadcast_async",
    "*parallel",
];

pub const TRANSPORTS: &[&str] = &["*json", "*gob", "*birpc_json", "*birpc_gob", "*http_jsonrpc"];

/// One peer of a connection pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteHost {
    pub id: String,
    pub address: String,
    pub transport: String,
    pub tls: bool,
    pub connect_attempts: i64,
    pub reconnects: i64,
    pub connect_timeout: Duration,
    pub reply_timeout: Duration,
}

impl Default for RemoteHost {
    fn default() -> Self {
        Self {
            id: String::new(),
            address: String::new(),
            transport: "*json".to_string(),
            tls: false,
            connect_attempts: 0,
            reconnects: 0,
            connect_timeout: Duration::ZERO,
            reply_timeout: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteHostJson {
    pub id: Option<String>,
    pub address: Option<String>,
    pub transport: Option<String>,
    pub tls: Option<bool>,
    pub connect_attempts: Option<i64>,
    pub reconnects: Option<i64>,
    pub connect_timeout: Option<String>,
    pub reply_timeout: Option<String>,
}

impl RemoteHost {
    fn from_json(jsn: &RemoteHostJson) -> Result<Self, ConfigError> {
        let mut host = Self::default();
        set(&mut host.id, &jsn.id);
        set(&mut host.address, &jsn.address);
        set(&mut host.transport, &jsn.transport);
        set(&mut host.tls, &jsn.tls);
        set(&mut host.connect_attempts, &jsn.connect_attempts);
        set(&mut host.reconnects, &jsn.reconnects);
        set_duration(&mut host.connect_timeout, &jsn.connect_timeout)?;
        set_duration(&mut host.reply_timeout, &jsn.reply_timeout)?;
        Ok(host)
    }

    fn to_json(&self) -> RemoteHostJson {
        RemoteHostJson {
            id: Some(self.id.clone()),
            address: Some(self.address.clone()),
            transport: Some(self.transport.clone()),
            tls: Some(self.tls),
            connect_attempts: Some(self.connect_attempts),
            reconnects: Some(self.reconnects),
            connect_timeout: duration_json(self.connect_timeout),
            reply_timeout: duration_json(self.reply_timeout),
        }
    }
}

/// A connection pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcConn {
    pub strategy: String,
    pub pool_size: i64,
    pub reply_timeout: Duration,
    pub conns: Vec<RemoteHost>,
}

impl Default for RpcConn {
    fn default() -> Self {
        Self {
            strategy: "*first".to_string(),
            pool_size: 0,
            reply_timeout: Duration::ZERO,
            conns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcConnJson {
    pub strategy: Option<String>,
    pub pool_size: Option<i64>,
    pub reply_timeout: Option<String>,
    pub conns: Option<Vec<RemoteHostJson>>,
}

impl RpcConn {
    fn load_json(&mut self, jsn: &RpcConnJson) -> Result<(), ConfigError> {
        set(&mut self.strategy, &jsn.strategy);
        set(&mut self.pool_size, &jsn.pool_size);
        set_duration(&mut self.reply_timeout, &jsn.reply_timeout)?;
        if let Some(conns) = &jsn.conns {
            self.conns = conns
                .iter()
                .map(RemoteHost::from_json)
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    fn to_json(&self) -> RpcConnJson {
        RpcConnJson {
            strategy: Some(self.strategy.clone()),
            pool_size: Some(self.pool_size),
            reply_timeout: duration_json(self.reply_timeout),
            conns: Some(self.conns.iter().map(RemoteHost::to_json).collect()),
        }
    }
}

/// Connection pools keyed by connection ID.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcConnsCfg(pub BTreeMap<String, RpcConn>);

impl Default for RpcConnsCfg {
    fn default() -> Self {
        let localhost = RpcConn {
            conns: vec![RemoteHost {
                address: "127.0.0.1:2012".to_string(),
                ..RemoteHost::default()
            }],
            ..RpcConn::default()
        };
        Self(BTreeMap::from([(META_LOCALHOST.to_string(), localhost)]))
    }
}

impl RpcConnsCfg {
    pub fn get(&self, id: &str) -> Option<&RpcConn> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RpcConn)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcConnsJson(pub BTreeMap<String, RpcConnJson>);

impl Section for RpcConnsCfg {
    const NAME: &'static str = "rpc_conns";
    type Json = RpcConnsJson;

    fn load_json(&mut self, jsn: Option<&RpcConnsJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        for (id, conn) in &jsn.0 {
            self.0.entry(id.clone()).or_default().load_json(conn)?;
        }
        Ok(())
    }

    fn to_json(&self) -> RpcConnsJson {
        RpcConnsJson(
            self.0
                .iter()
                .map(|(id, conn)| (id.clone(), conn.to_json()))
                .collect(),
        )
    }
}
