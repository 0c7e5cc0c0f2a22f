//! Error types for configuration loading, diffing and persistence.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors raised by the configuration subsystem.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a configuration file or directory failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or a section has the wrong shape.
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `*env:` reference names an unset environment variable.
    #[error("NOT_FOUND:ENV_VAR:{0}")]
    EnvNotFound(String),

    /// A duration string could not be parsed.
    #[error("invalid duration <{0}>")]
    InvalidDuration(String),

    /// A numeric string could not be parsed.
    #[error("invalid number <{0}>")]
    InvalidNumber(String),

    /// A connection list that must point to a remote peer contains `*internal`.
    #[error("{0} connection ID needs to be different than *internal")]
    InternalConnNotAllowed(&'static str),

    /// The named section does not exist.
    #[error("Invalid section <{0}>")]
    InvalidSection(String),

    /// A request is missing a mandatory field.
    #[error("MANDATORY_IE_MISSING: [{0}]")]
    MandatoryFieldMissing(&'static str),

    /// A reload asked for a path while the configuration is backed by a store.
    #[error("reload from path is disabled when a config store is configured")]
    ReloadSourceConflict,

    /// Semantic checks failed.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The configuration store failed.
    #[error("config store error: {0}")]
    Store(String),

    /// The file watcher could not be installed.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidDuration("5x".into());
        assert_eq!(err.to_string(), "invalid duration <5x>");

        let err = ConfigError::InternalConnNotAllowed("Replication");
        assert_eq!(
            err.to_string(),
            "Replication connection ID needs to be different than *internal"
        );

        let err = ConfigError::Validation(vec![
            ValidationError::MissingSessionConns("diameter_agent"),
            ValidationError::UnknownCapsStrategy("*drop".into()),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("diameter_agent"));
        assert!(text.contains("*drop"));
    }
}
