//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that connections point at something: an enabled in-process service
//!   or a pool defined in `rpc_conns`
//! - Validate enumerated values and ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ChargingConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system, on load and on every API write

use thiserror::Error;

use crate::config::conns::{internal_tag, is_internal, subsystem, META_INTERNAL};
use crate::config::schema::ChargingConfig;
use crate::config::sections::cores::CAPS_STRATEGIES;
use crate::config::sections::db::DB_TYPES;
use crate::config::sections::rpc_conns::{POOL_STRATEGIES, TRANSPORTS};

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("<{service}> not enabled but requested by <{requested_by}> component")]
    ServiceNotEnabled {
        service: &'static str,
        requested_by: &'static str,
    },
    #[error("<{section}> connection with id <{conn}> not defined in rpc_conns")]
    UnknownConnection { section: &'static str, conn: String },
    #[error("rpc_conns <{0}> has no connections")]
    EmptyRpcConn(String),
    #[error("rpc_conns <{conn}> has unsupported strategy <{strategy}>")]
    UnknownPoolStrategy { conn: String, strategy: String },
    #[error("rpc_conns <{conn}> has unsupported transport <{transport}>")]
    UnknownTransport { conn: String, transport: String },
    #[error("<{0}> enabled but sessions_conns is empty")]
    MissingSessionConns(&'static str),
    #[error("<{section}> has unsupported db_type <{db_type}>")]
    UnknownDbType {
        section: &'static str,
        db_type: String,
    },
    #[error("cores.caps_strategy <{0}> must be one of *busy, *queue")]
    UnknownCapsStrategy(String),
    #[error("general.rounding_decimals must be within 0..=20, got {0}")]
    RoundingDecimalsOutOfRange(i64),
    #[error("general.digest_separator must not be empty")]
    EmptyDigestSeparator,
    #[error("TLS listener configured without tls.server_certificate and tls.server_key")]
    MissingTlsKeyPair,
}

/// One connection list of a consuming service.
struct ConnList<'a> {
    ids: &'a [String],
    /// Subsystem an `*internal` id in this list routes to.
    target: &'static str,
}

struct Consumer<'a> {
    name: &'static str,
    enabled: bool,
    conns: Vec<ConnList<'a>>,
}

fn conns<'a>(ids: &'a [String], target: &'static str) -> ConnList<'a> {
    ConnList { ids, target }
}

fn consumers(cfg: &ChargingConfig) -> Vec<Consumer<'_>> {
    use subsystem::*;
    vec![
        Consumer {
            name: "admins",
            enabled: cfg.admins.enabled,
            conns: vec![
                conns(&cfg.admins.caches_conns, CACHES),
                conns(&cfg.admins.actions_conns, ACTIONS),
                conns(&cfg.admins.attributes_conns, ATTRIBUTES),
                conns(&cfg.admins.ees_conns, EES),
            ],
        },
        Consumer {
            name: "accounts",
            enabled: cfg.accounts.enabled,
            conns: vec![
                conns(&cfg.accounts.attributes_conns, ATTRIBUTES),
                conns(&cfg.accounts.rates_conns, RATES),
                conns(&cfg.accounts.thresholds_conns, THRESHOLDS),
            ],
        },
        Consumer {
            name: "attributes",
            enabled: cfg.attributes.enabled,
            conns: vec![
                conns(&cfg.attributes.stats_conns, STATS),
                conns(&cfg.attributes.resources_conns, RESOURCES),
                conns(&cfg.attributes.accounts_conns, ACCOUNTS),
            ],
        },
        Consumer {
            name: "chargers",
            enabled: cfg.chargers.enabled,
            conns: vec![conns(&cfg.chargers.attributes_conns, ATTRIBUTES)],
        },
        Consumer {
            name: "resources",
            enabled: cfg.resources.enabled,
            conns: vec![conns(&cfg.resources.thresholds_conns, THRESHOLDS)],
        },
        Consumer {
            name: "thresholds",
            enabled: cfg.thresholds.enabled,
            conns: vec![conns(&cfg.thresholds.actions_conns, ACTIONS)],
        },
        Consumer {
            name: "stats",
            enabled: cfg.stats.enabled,
            conns: vec![conns(&cfg.stats.thresholds_conns, THRESHOLDS)],
        },
        Consumer {
            name: "routes",
            enabled: cfg.routes.enabled,
            conns: vec![
                conns(&cfg.routes.attributes_conns, ATTRIBUTES),
                conns(&cfg.routes.resources_conns, RESOURCES),
                conns(&cfg.routes.stats_conns, STATS),
                conns(&cfg.routes.accounts_conns, ACCOUNTS),
                conns(&cfg.routes.rates_conns, RATES),
            ],
        },
        Consumer {
            name: "rals",
            enabled: cfg.rals.enabled,
            conns: vec![
                conns(&cfg.rals.thresholds_conns, THRESHOLDS),
                conns(&cfg.rals.stats_conns, STATS),
            ],
        },
        Consumer {
            name: "cdrs",
            enabled: cfg.cdrs.enabled,
            conns: vec![
                conns(&cfg.cdrs.chargers_conns, CHARGERS),
                conns(&cfg.cdrs.attributes_conns, ATTRIBUTES),
                conns(&cfg.cdrs.thresholds_conns, THRESHOLDS),
                conns(&cfg.cdrs.stats_conns, STATS),
                conns(&cfg.cdrs.actions_conns, ACTIONS),
                conns(&cfg.cdrs.ees_conns, EES),
            ],
        },
        Consumer {
            name: "sessions",
            enabled: cfg.sessions.enabled,
            conns: vec![
                conns(&cfg.sessions.chargers_conns, CHARGERS),
                conns(&cfg.sessions.resources_conns, RESOURCES),
                conns(&cfg.sessions.thresholds_conns, THRESHOLDS),
                conns(&cfg.sessions.stats_conns, STATS),
                conns(&cfg.sessions.routes_conns, ROUTES),
                conns(&cfg.sessions.attributes_conns, ATTRIBUTES),
                conns(&cfg.sessions.cdrs_conns, CDRS),
                conns(&cfg.sessions.actions_conns, ACTIONS),
                conns(&cfg.sessions.rates_conns, RATES),
                conns(&cfg.sessions.accounts_conns, ACCOUNTS),
                conns(&cfg.sessions.replication_conns, SESSIONS),
            ],
        },
        Consumer {
            name: "diameter_agent",
            enabled: cfg.diameter_agent.enabled,
            conns: vec![
                conns(&cfg.diameter_agent.sessions_conns, SESSIONS),
                conns(&cfg.diameter_agent.stats_conns, STATS),
                conns(&cfg.diameter_agent.thresholds_conns, THRESHOLDS),
            ],
        },
        Consumer {
            name: "radius_agent",
            enabled: cfg.radius_agent.enabled,
            conns: vec![
                conns(&cfg.radius_agent.sessions_conns, SESSIONS),
                conns(&cfg.radius_agent.stats_conns, STATS),
                conns(&cfg.radius_agent.thresholds_conns, THRESHOLDS),
            ],
        },
        Consumer {
            name: "data_db",
            enabled: true,
            conns: vec![
                conns(&cfg.data_db.remote_conns, ""),
                conns(&cfg.data_db.replication_conns, ""),
            ],
        },
        Consumer {
            name: "stor_db",
            enabled: true,
            conns: vec![
                conns(&cfg.stor_db.remote_conns, ""),
                conns(&cfg.stor_db.replication_conns, ""),
            ],
        },
    ]
}

/// Whether the in-process service behind `subsystem` is enabled. Subsystems
/// without a section here are always available.
fn service_enabled(cfg: &ChargingConfig, target: &str) -> Option<bool> {
    let enabled = match target {
        subsystem::ACCOUNTS => cfg.accounts.enabled,
        subsystem::ATTRIBUTES => cfg.attributes.enabled,
        subsystem::CDRS => cfg.cdrs.enabled,
        subsystem::CHARGERS => cfg.chargers.enabled,
        subsystem::RESOURCES => cfg.resources.enabled,
        subsystem::ROUTES => cfg.routes.enabled,
        subsystem::SESSIONS => cfg.sessions.enabled,
        subsystem::STATS => cfg.stats.enabled,
        subsystem::THRESHOLDS => cfg.thresholds.enabled,
        _ => return None,
    };
    Some(enabled)
}

fn service_name(target: &'static str) -> &'static str {
    target.trim_start_matches('*')
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(cfg: &ChargingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_connections(cfg, &mut errors);
    check_rpc_conns(cfg, &mut errors);

    for (name, enabled, sessions_conns) in [
        ("diameter_agent", cfg.diameter_agent.enabled, &cfg.diameter_agent.sessions_conns),
        ("radius_agent", cfg.radius_agent.enabled, &cfg.radius_agent.sessions_conns),
    ] {
        if enabled && sessions_conns.is_empty() {
            errors.push(ValidationError::MissingSessionConns(name));
        }
    }

    for (section, db_type) in [("data_db", &cfg.data_db.db_type), ("stor_db", &cfg.stor_db.db_type)] {
        if !DB_TYPES.contains(&db_type.as_str()) {
            errors.push(ValidationError::UnknownDbType {
                section,
                db_type: db_type.clone(),
            });
        }
    }

    if !CAPS_STRATEGIES.contains(&cfg.cores.caps_strategy.as_str()) {
        errors.push(ValidationError::UnknownCapsStrategy(cfg.cores.caps_strategy.clone()));
    }

    // General settings
    if !(0..=20).contains(&cfg.general.rounding_decimals) {
        errors.push(ValidationError::RoundingDecimalsOutOfRange(cfg.general.rounding_decimals));
    }
    if cfg.general.digest_separator.is_empty() {
        errors.push(ValidationError::EmptyDigestSeparator);
    }

    if cfg.listen.has_tls_listener()
        && (cfg.tls.server_certificate.is_empty() || cfg.tls.server_key.is_empty())
    {
        errors.push(ValidationError::MissingTlsKeyPair);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_connections(cfg: &ChargingConfig, errors: &mut Vec<ValidationError>) {
    for consumer in consumers(cfg).into_iter().filter(|c| c.enabled) {
        for list in &consumer.conns {
            let mut reported_disabled = false;
            for id in list.ids {
                if is_internal(id) {
                    if reported_disabled || list.target.is_empty() {
                        continue;
                    }
                    let targets_self = id == META_INTERNAL || *id == internal_tag(list.target);
                    if targets_self && service_enabled(cfg, list.target) == Some(false) {
                        errors.push(ValidationError::ServiceNotEnabled {
                            service: service_name(list.target),
                            requested_by: consumer.name,
                        });
                        reported_disabled = true;
                    }
                } else if !cfg.rpc_conns.contains(id) {
                    errors.push(ValidationError::UnknownConnection {
                        section: consumer.name,
                        conn: id.clone(),
                    });
                }
            }
        }
    }
}

fn check_rpc_conns(cfg: &ChargingConfig, errors: &mut Vec<ValidationError>) {
    for (id, pool) in cfg.rpc_conns.iter() {
        if pool.conns.is_empty() {
            errors.push(ValidationError::EmptyRpcConn(id.clone()));
        }
        if !POOL_STRATEGIES.contains(&pool.strategy.as_str()) {
            errors.push(ValidationError::UnknownPoolStrategy {
                conn: id.clone(),
                strategy: pool.strategy.clone(),
            });
        }
        for host in &pool.conns {
            if !TRANSPORTS.contains(&host.transport.as_str()) {
                errors.push(ValidationError::UnknownTransport {
                    conn: id.clone(),
                    transport: host.transport.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sections::rpc_conns::RpcConn;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ChargingConfig::default()), Ok(()));
    }

    #[test]
    fn test_internal_conn_to_disabled_service() {
        let mut cfg = ChargingConfig::default();
        cfg.sessions.enabled = true;
        cfg.sessions.stats_conns = vec![internal_tag(subsystem::STATS)];
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ServiceNotEnabled {
                service: "stats",
                requested_by: "sessions",
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "<stats> not enabled but requested by <sessions> component"
        );

        cfg.stats.enabled = true;
        assert_eq!(validate_config(&cfg), Ok(()));
    }

    #[test]
    fn test_disabled_consumer_is_not_checked() {
        let mut cfg = ChargingConfig::default();
        cfg.cdrs.chargers_conns = vec![internal_tag(subsystem::CHARGERS), "nowhere".to_string()];
        assert_eq!(validate_config(&cfg), Ok(()));
    }

    #[test]
    fn test_unknown_connection_id() {
        let mut cfg = ChargingConfig::default();
        cfg.cdrs.enabled = true;
        cfg.cdrs.ees_conns = vec!["*localhost".to_string(), "conn_ees".to_string()];
        cfg.data_db.replication_conns = vec!["rpl".to_string()];
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownConnection {
                    section: "cdrs",
                    conn: "conn_ees".to_string(),
                },
                ValidationError::UnknownConnection {
                    section: "data_db",
                    conn: "rpl".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rpc_conns_checks() {
        let mut cfg = ChargingConfig::default();
        cfg.rpc_conns.0.insert(
            "broken".to_string(),
            RpcConn {
                strategy: "*roundrobin".to_string(),
                ..RpcConn::default()
            },
        );
        if let Some(localhost) = cfg.rpc_conns.0.get_mut("*localhost") {
            localhost.conns[0].transport = "*xml".to_string();
        }
        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyRpcConn("broken".to_string())));
        assert!(errors.contains(&ValidationError::UnknownPoolStrategy {
            conn: "broken".to_string(),
            strategy: "*roundrobin".to_string(),
        }));
        assert!(errors.contains(&ValidationError::UnknownTransport {
            conn: "*localhost".to_string(),
            transport: "*xml".to_string(),
        }));
    }

    #[test]
    fn test_collects_every_error() {
        let mut cfg = ChargingConfig::default();
        cfg.diameter_agent.enabled = true;
        cfg.diameter_agent.sessions_conns.clear();
        cfg.stor_db.db_type = "*oracle".to_string();
        cfg.cores.caps_strategy = "*drop".to_string();
        cfg.general.rounding_decimals = 42;
        cfg.general.digest_separator.clear();
        cfg.listen.http_tls = "127.0.0.1:2280".to_string();

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingSessionConns("diameter_agent"),
                ValidationError::UnknownDbType {
                    section: "stor_db",
                    db_type: "*oracle".to_string(),
                },
                ValidationError::UnknownCapsStrategy("*drop".to_string()),
                ValidationError::RoundingDecimalsOutOfRange(42),
                ValidationError::EmptyDigestSeparator,
                ValidationError::MissingTlsKeyPair,
            ]
        );
    }
}
