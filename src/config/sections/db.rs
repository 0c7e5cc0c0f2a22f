//! `data_db` and `stor_db` sections: database connections and per-item
//! caching/replication options.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::conns::reject_internal_conns;
use crate::config::duration::parse_binary_size;
use crate::config::error::ConfigError;
use crate::config::section::Section;
use crate::config::sections::{duration_json, set, set_duration};

/// Port value asking for the database type's default port.
pub const DYNAMIC_PORT: i64 = -1;

pub const DB_TYPES: &[&str] = &["*redis", "*mongo", "*mysql", "*postgres", "*internal"];

/// Default port for `db_type`. The internal database has no port.
pub fn default_db_port(db_type: &str) -> Option<&'static str> {
    match db_type {
        "*mysql" => Some("3306"),
        "*postgres" => Some("5432"),
        "*mongo" => Some("27017"),
        "*redis" => Some("6379"),
        "*internal" => Some("internal"),
        _ => None,
    }
}

fn load_db_type(dst: &mut String, src: &Option<String>) {
    if let Some(db_type) = src {
        *dst = if db_type.starts_with('*') {
            db_type.clone()
        } else {
            format!("*{db_type}")
        };
    }
}

fn load_db_port(dst: &mut String, db_type: &str, src: &Option<i64>) {
    if let Some(port) = src {
        *dst = match (*port, default_db_port(db_type)) {
            (DYNAMIC_PORT, Some(default)) => default.to_string(),
            (port, _) => port.to_string(),
        };
    }
}

fn port_json(port: &str) -> Option<i64> {
    Some(port.parse().unwrap_or(DYNAMIC_PORT))
}

/// Caching and replication options of one stored item kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOpts {
    /// `-1` means unlimited.
    pub limit: i64,
    pub ttl: Duration,
    pub static_ttl: bool,
    pub remote: bool,
    pub replicate: bool,
    pub route_id: String,
    pub api_key: String,
}

impl Default for ItemOpts {
    fn default() -> Self {
        Self {
            limit: -1,
            ttl: Duration::ZERO,
            static_ttl: false,
            remote: false,
            replicate: false,
            route_id: String::new(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemOptsJson {
    pub limit: Option<i64>,
    pub ttl: Option<String>,
    pub static_ttl: Option<bool>,
    pub remote: Option<bool>,
    pub replicate: Option<bool>,
    pub route_id: Option<String>,
    pub api_key: Option<String>,
}

impl ItemOpts {
    fn load_json(&mut self, jsn: &ItemOptsJson) -> Result<(), ConfigError> {
        set(&mut self.limit, &jsn.limit);
        set_duration(&mut self.ttl, &jsn.ttl)?;
        set(&mut self.static_ttl, &jsn.static_ttl);
        set(&mut self.remote, &jsn.remote);
        set(&mut self.replicate, &jsn.replicate);
        set(&mut self.route_id, &jsn.route_id);
        set(&mut self.api_key, &jsn.api_key);
        Ok(())
    }

    fn to_json(&self) -> ItemOptsJson {
        ItemOptsJson {
            limit: Some(self.limit),
            ttl: duration_json(self.ttl),
            static_ttl: Some(self.static_ttl),
            remote: Some(self.remote),
            replicate: Some(self.replicate),
            route_id: Some(self.route_id.clone()),
            api_key: Some(self.api_key.clone()),
        }
    }
}

fn default_items(names: &[&str]) -> BTreeMap<String, ItemOpts> {
    names
        .iter()
        .map(|name| (name.to_string(), ItemOpts::default()))
        .collect()
}

/// Items named in the fragment are updated in place or created from defaults.
fn merge_items(
    dst: &mut BTreeMap<String, ItemOpts>,
    src: &Option<BTreeMap<String, ItemOptsJson>>,
) -> Result<(), ConfigError> {
    if let Some(items) = src {
        for (name, jsn) in items {
            dst.entry(name.clone()).or_default().load_json(jsn)?;
        }
    }
    Ok(())
}

fn items_json(items: &BTreeMap<String, ItemOpts>) -> Option<BTreeMap<String, ItemOptsJson>> {
    Some(
        items
            .iter()
            .map(|(name, item)| (name.clone(), item.to_json()))
            .collect(),
    )
}

const DATA_DB_ITEMS: &[&str] = &[
    "*accounts",
    "*actions",
    "*attribute_profiles",
    "*charger_profiles",
    "*filters",
    "*load_ids",
    "*resource_profiles",
    "*resources",
    "*route_profiles",
    "*statqueue_profiles",
    "*statqueues",
    "*threshold_profiles",
    "*thresholds",
];

const STOR_DB_ITEMS: &[&str] = &[
    "*cdrs",
    "*session_costs",
    "*tp_accounts",
    "*tp_attributes",
    "*tp_chargers",
    "*tp_filters",
    "*tp_resources",
    "*tp_routes",
    "*tp_stats",
    "*tp_thresholds",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DataDbOpts {
    pub redis_max_conns: i64,
    pub redis_connect_attempts: i64,
    pub redis_sentinel: String,
    pub redis_cluster: bool,
    pub redis_cluster_sync: Duration,
    pub redis_cluster_ondown_delay: Duration,
    pub redis_connect_timeout: Duration,
    pub redis_read_timeout: Duration,
    pub redis_write_timeout: Duration,
    pub redis_tls: bool,
    pub mongo_query_timeout: Duration,
    pub mongo_conn_scheme: String,
    pub internal_db_dump_path: String,
    pub internal_db_dump_interval: Duration,
    /// Bytes; `-1` means no limit.
    pub internal_db_file_size_limit: i64,
}

impl Default for DataDbOpts {
    fn default() -> Self {
        Self {
            redis_max_conns: 10,
            redis_connect_attempts: 20,
            redis_sentinel: String::new(),
            redis_cluster: false,
            redis_cluster_sync: Duration::from_secs(5),
            redis_cluster_ondown_delay: Duration::ZERO,
            redis_connect_timeout: Duration::ZERO,
            redis_read_timeout: Duration::ZERO,
            redis_write_timeout: Duration::ZERO,
            redis_tls: false,
            mongo_query_timeout: Duration::from_secs(10),
            mongo_conn_scheme: "mongodb".to_string(),
            internal_db_dump_path: "/var/lib/cgrates/internal_db/datadb".to_string(),
            internal_db_dump_interval: Duration::ZERO,
            internal_db_file_size_limit: 1 << 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataDbOptsJson {
    pub redis_max_conns: Option<i64>,
    pub redis_connect_attempts: Option<i64>,
    pub redis_sentinel: Option<String>,
    pub redis_cluster: Option<bool>,
    pub redis_cluster_sync: Option<String>,
    pub redis_cluster_ondown_delay: Option<String>,
    pub redis_connect_timeout: Option<String>,
    pub redis_read_timeout: Option<String>,
    pub redis_write_timeout: Option<String>,
    pub redis_tls: Option<bool>,
    pub mongo_query_timeout: Option<String>,
    pub mongo_conn_scheme: Option<String>,
    pub internal_db_dump_path: Option<String>,
    pub internal_db_dump_interval: Option<String>,
    pub internal_db_file_size_limit: Option<String>,
}

impl DataDbOpts {
    fn load_json(&mut self, jsn: &DataDbOptsJson) -> Result<(), ConfigError> {
        set(&mut self.redis_max_conns, &jsn.redis_max_conns);
        set(&mut self.redis_connect_attempts, &jsn.redis_connect_attempts);
        set(&mut self.redis_sentinel, &jsn.redis_sentinel);
        set(&mut self.redis_cluster, &jsn.redis_cluster);
        set_duration(&mut self.redis_cluster_sync, &jsn.redis_cluster_sync)?;
        set_duration(&mut self.redis_cluster_ondown_delay, &jsn.redis_cluster_ondown_delay)?;
        set_duration(&mut self.redis_connect_timeout, &jsn.redis_connect_timeout)?;
        set_duration(&mut self.redis_read_timeout, &jsn.redis_read_timeout)?;
        set_duration(&mut self.redis_write_timeout, &jsn.redis_write_timeout)?;
        set(&mut self.redis_tls, &jsn.redis_tls);
        set_duration(&mut self.mongo_query_timeout, &jsn.mongo_query_timeout)?;
        set(&mut self.mongo_conn_scheme, &jsn.mongo_conn_scheme);
        set(&mut self.internal_db_dump_path, &jsn.internal_db_dump_path);
        set_duration(&mut self.internal_db_dump_interval, &jsn.internal_db_dump_interval)?;
        if let Some(raw) = &jsn.internal_db_file_size_limit {
            self.internal_db_file_size_limit = parse_binary_size(raw)?;
        }
        Ok(())
    }

    fn to_json(&self) -> DataDbOptsJson {
        DataDbOptsJson {
            redis_max_conns: Some(self.redis_max_conns),
            redis_connect_attempts: Some(self.redis_connect_attempts),
            redis_sentinel: Some(self.redis_sentinel.clone()),
            redis_cluster: Some(self.redis_cluster),
            redis_cluster_sync: duration_json(self.redis_cluster_sync),
            redis_cluster_ondown_delay: duration_json(self.redis_cluster_ondown_delay),
            redis_connect_timeout: duration_json(self.redis_connect_timeout),
            redis_read_timeout: duration_json(self.redis_read_timeout),
            redis_write_timeout: duration_json(self.redis_write_timeout),
            redis_tls: Some(self.redis_tls),
            mongo_query_timeout: duration_json(self.mongo_query_timeout),
            mongo_conn_scheme: Some(self.mongo_conn_scheme.clone()),
            internal_db_dump_path: Some(self.internal_db_dump_path.clone()),
            internal_db_dump_interval: duration_json(self.internal_db_dump_interval),
            internal_db_file_size_limit: Some(self.internal_db_file_size_limit.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataDbCfg {
    /// Always carries the `*` prefix, e.g. `*redis`.
    pub db_type: String,
    pub db_host: String,
    /// Port as text; `internal` for the internal database.
    pub db_port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub remote_conns: Vec<String>,
    pub remote_conn_id: String,
    pub replication_conns: Vec<String>,
    pub replication_filtered: bool,
    pub replication_cache: String,
    pub items: BTreeMap<String, ItemOpts>,
    pub opts: DataDbOpts,
}

impl Default for DataDbCfg {
    fn default() -> Self {
        Self {
            db_type: "*redis".to_string(),
            db_host: "127.0.0.1".to_string(),
            db_port: "6379".to_string(),
            db_name: "10".to_string(),
            db_user: "cgrates".to_string(),
            db_password: String::new(),
            remote_conns: Vec::new(),
            remote_conn_id: String::new(),
            replication_conns: Vec::new(),
            replication_filtered: false,
            replication_cache: String::new(),
            items: default_items(DATA_DB_ITEMS),
            opts: DataDbOpts::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataDbJson {
    pub db_type: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<i64>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub remote_conns: Option<Vec<String>>,
    pub remote_conn_id: Option<String>,
    pub replication_conns: Option<Vec<String>>,
    pub replication_filtered: Option<bool>,
    pub replication_cache: Option<String>,
    pub items: Option<BTreeMap<String, ItemOptsJson>>,
    pub opts: Option<DataDbOptsJson>,
}

impl Section for DataDbCfg {
    const NAME: &'static str = "data_db";
    type Json = DataDbJson;

    fn load_json(&mut self, jsn: Option<&DataDbJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        load_db_type(&mut self.db_type, &jsn.db_type);
        set(&mut self.db_host, &jsn.db_host);
        load_db_port(&mut self.db_port, &self.db_type, &jsn.db_port);
        set(&mut self.db_name, &jsn.db_name);
        set(&mut self.db_user, &jsn.db_user);
        set(&mut self.db_password, &jsn.db_password);
        if let Some(ids) = &jsn.remote_conns {
            self.remote_conns = reject_internal_conns(ids, "Remote")?;
        }
        set(&mut self.remote_conn_id, &jsn.remote_conn_id);
        if let Some(ids) = &jsn.replication_conns {
            self.replication_conns = reject_internal_conns(ids, "Replication")?;
        }
        set(&mut self.replication_filtered, &jsn.replication_filtered);
        set(&mut self.replication_cache, &jsn.replication_cache);
        merge_items(&mut self.items, &jsn.items)?;
        if let Some(opts) = &jsn.opts {
            self.opts.load_json(opts)?;
        }
        Ok(())
    }

    fn to_json(&self) -> DataDbJson {
        DataDbJson {
            db_type: Some(self.db_type.clone()),
            db_host: Some(self.db_host.clone()),
            db_port: port_json(&self.db_port),
            db_name: Some(self.db_name.clone()),
            db_user: Some(self.db_user.clone()),
            db_password: Some(self.db_password.clone()),
            remote_conns: Some(self.remote_conns.clone()),
            remote_conn_id: Some(self.remote_conn_id.clone()),
            replication_conns: Some(self.replication_conns.clone()),
            replication_filtered: Some(self.replication_filtered),
            replication_cache: Some(self.replication_cache.clone()),
            items: items_json(&self.items),
            opts: Some(self.opts.to_json()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorDbOpts {
    pub sql_max_open_conns: i64,
    pub sql_max_idle_conns: i64,
    pub sql_conn_max_lifetime: Duration,
    pub sql_dsn_params: BTreeMap<String, String>,
    pub pg_ssl_mode: String,
    pub mysql_location: String,
    pub mongo_query_timeout: Duration,
    pub mongo_conn_scheme: String,
}

impl Default for StorDbOpts {
    fn default() -> Self {
        Self {
            sql_max_open_conns: 100,
            sql_max_idle_conns: 10,
            sql_conn_max_lifetime: Duration::ZERO,
            sql_dsn_params: BTreeMap::new(),
            pg_ssl_mode: "disable".to_string(),
            mysql_location: "Local".to_string(),
            mongo_query_timeout: Duration::from_secs(10),
            mongo_conn_scheme: "mongodb".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorDbOptsJson {
    pub sql_max_open_conns: Option<i64>,
    pub sql_max_idle_conns: Option<i64>,
    pub sql_conn_max_lifetime: Option<String>,
    pub sql_dsn_params: Option<BTreeMap<String, String>>,
    pub pg_ssl_mode: Option<String>,
    pub mysql_location: Option<String>,
    pub mongo_query_timeout: Option<String>,
    pub mongo_conn_scheme: Option<String>,
}

impl StorDbOpts {
    fn load_json(&mut self, jsn: &StorDbOptsJson) -> Result<(), ConfigError> {
        set(&mut self.sql_max_open_conns, &jsn.sql_max_open_conns);
        set(&mut self.sql_max_idle_conns, &jsn.sql_max_idle_conns);
        set_duration(&mut self.sql_conn_max_lifetime, &jsn.sql_conn_max_lifetime)?;
        if let Some(params) = &jsn.sql_dsn_params {
            self.sql_dsn_params.extend(params.clone());
        }
        set(&mut self.pg_ssl_mode, &jsn.pg_ssl_mode);
        set(&mut self.mysql_location, &jsn.mysql_location);
        set_duration(&mut self.mongo_query_timeout, &jsn.mongo_query_timeout)?;
        set(&mut self.mongo_conn_scheme, &jsn.mongo_conn_scheme);
        Ok(())
    }

    fn to_json(&self) -> StorDbOptsJson {
        StorDbOptsJson {
            sql_max_open_conns: Some(self.sql_max_open_conns),
            sql_max_idle_conns: Some(self.sql_max_idle_conns),
            sql_conn_max_lifetime: duration_json(self.sql_conn_max_lifetime),
            sql_dsn_params: Some(self.sql_dsn_params.clone()),
            pg_ssl_mode: Some(self.pg_ssl_mode.clone()),
            mysql_location: Some(self.mysql_location.clone()),
            mongo_query_timeout: duration_json(self.mongo_query_timeout),
            mongo_conn_scheme: Some(self.mongo_conn_scheme.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorDbCfg {
    pub db_type: String,
    pub db_host: String,
    pub db_port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub string_indexed_fields: Vec<String>,
    pub prefix_indexed_fields: Vec<String>,
    pub remote_conns: Vec<String>,
    pub replication_conns: Vec<String>,
    pub items: BTreeMap<String, ItemOpts>,
    pub opts: StorDbOpts,
}

impl Default for StorDbCfg {
    fn default() -> Self {
        Self {
            db_type: "*mysql".to_string(),
            db_host: "127.0.0.1".to_string(),
            db_port: "3306".to_string(),
            db_name: "cgrates".to_string(),
            db_user: "cgrates".to_string(),
            db_password: String::new(),
            string_indexed_fields: Vec::new(),
            prefix_indexed_fields: Vec::new(),
            remote_conns: Vec::new(),
            replication_conns: Vec::new(),
            items: default_items(STOR_DB_ITEMS),
            opts: StorDbOpts::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorDbJson {
    pub db_type: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<i64>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub string_indexed_fields: Option<Vec<String>>,
    pub prefix_indexed_fields: Option<Vec<String>>,
    pub remote_conns: Option<Vec<String>>,
    pub replication_conns: Option<Vec<String>>,
    pub items: Option<BTreeMap<String, ItemOptsJson>>,
    pub opts: Option<StorDbOptsJson>,
}

impl Section for StorDbCfg {
    const NAME: &'static str = "stor_db";
    type Json = StorDbJson;

    fn load_json(&mut self, jsn: Option<&StorDbJson>) -> Result<(), ConfigError> {
        let Some(jsn) = jsn else {
            return Ok(());
        };
        load_db_type(&mut self.db_type, &jsn.db_type);
        set(&mut self.db_host, &jsn.db_host);
        load_db_port(&mut self.db_port, &self.db_type, &jsn.db_port);
        set(&mut self.db_name, &jsn.db_name);
        set(&mut self.db_user, &jsn.db_user);
        set(&mut self.db_password, &jsn.db_password);
        set(&mut self.string_indexed_fields, &jsn.string_indexed_fields);
        set(&mut self.prefix_indexed_fields, &jsn.prefix_indexed_fields);
        if let Some(ids) = &jsn.remote_conns {
            self.remote_conns = reject_internal_conns(ids, "Remote")?;
        }
        if let Some(ids) = &jsn.replication_conns {
            self.replication_conns = reject_internal_conns(ids, "Replication")?;
        }
        merge_items(&mut self.items, &jsn.items)?;
        if let Some(opts) = &jsn.opts {
            self.opts.load_json(opts)?;
        }
        Ok(())
    }

    fn to_json(&self) -> StorDbJson {
        StorDbJson {
            db_type: Some(self.db_type.clone()),
            db_host: Some(self.db_host.clone()),
            db_port: port_json(&self.db_port),
            db_name: Some(self.db_name.clone()),
            db_user: Some(self.db_user.clone()),
            db_password: Some(self.db_password.clone()),
            string_indexed_fields: Some(self.string_indexed_fields.clone()),
            prefix_indexed_fields: Some(self.prefix_indexed_fields.clone()),
            remote_conns: Some(self.remote_conns.clone()),
            replication_conns: Some(self.replication_conns.clone()),
            items: items_json(&self.items),
            opts: Some(self.opts.to_json()),
        }
    }
}
