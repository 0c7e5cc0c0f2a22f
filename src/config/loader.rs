//! Configuration loading from disk.
//!
//! A path is either one JSON file or a directory whose `*.json` files are
//! loaded recursively in lexical path order, each layered over the previous.
//! The reader accepts `//` and `/* */` comments and trailing commas, and
//! replaces `*env:NAME` references with the value of the environment variable.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::error::ConfigError;
use crate::config::schema::ChargingConfig;
use crate::config::validation::validate_config;

/// Load, layer over defaults and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<ChargingConfig, ConfigError> {
    let mut config = ChargingConfig::default();
    load_into(&mut config, path, None)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Layer the documents at `path` onto `config`, optionally only some sections.
pub fn load_into(
    config: &mut ChargingConfig,
    path: &Path,
    only: Option<&[&str]>,
) -> Result<(), ConfigError> {
    for (file, doc) in read_documents(path)? {
        tracing::debug!(path = %file.display(), "Loading configuration file");
        match only {
            Some(sections) => config.load_sections(&doc, sections)?,
            None => config.load_document(&doc)?,
        }
    }
    Ok(())
}

/// Parse every document under `path` in load order.
pub fn read_documents(path: &Path) -> Result<Vec<(PathBuf, Map<String, Value>)>, ConfigError> {
    let files = if path.is_dir() {
        let mut files = Vec::new();
        collect_json_files(path, &mut files)?;
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    files
        .into_iter()
        .map(|file| {
            let content = fs::read_to_string(&file)
                .map_err(|e| ConfigError::io(file.display().to_string(), e))?;
            let doc = parse_document(&content)?;
            Ok((file, doc))
        })
        .collect()
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let entries = fs::read_dir(dir).map_err(|e| ConfigError::io(dir.display().to_string(), e))?;
    for entry in entries {
        let path = entry
            .map_err(|e| ConfigError::io(dir.display().to_string(), e))?
            .path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

const ENV_PREFIX: &str = "*env:";

/// Parse a configuration document, tolerating comments and trailing commas.
pub fn parse_document(text: &str) -> Result<Map<String, Value>, ConfigError> {
    let clean = strip_trailing_commas(&substitute_env(&strip_comments(text))?);
    Ok(serde_json::from_str(&clean)?)
}

/// Replace every `*env:NAME` with the value of `NAME`. Inside a string literal
/// the value is escaped; outside one it is inserted as is, so numbers work too.
pub fn substitute_env(text: &str) -> Result<String, ConfigError> {
    if !text.contains(ENV_PREFIX) {
        return Ok(text.to_string());
    }
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if !escaped {
            if let Some(after) = rest.strip_prefix(ENV_PREFIX) {
                let name_len = after
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();
                if name_len > 0 {
                    let name = &after[..name_len];
                    let value = std::env::var(name)
                        .map_err(|_| ConfigError::EnvNotFound(name.to_string()))?;
                    if in_string {
                        let quoted = serde_json::to_string(&value)?;
                        out.push_str(&quoted[1..quoted.len() - 1]);
                    } else {
                        out.push_str(&value);
                    }
                    rest = &after[name_len..];
                    continue;
                }
            }
        }

        out.push(c);
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }
        rest = &rest[c.len_utf8()..];
    }
    Ok(out)
}

/// Remove `//` and `/* */` comments outside string literals. Newlines are kept
/// so parse errors still point at the right line.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Drop commas that directly precede `}` or `]`.
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}
