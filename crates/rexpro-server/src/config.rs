//! Server configuration with file and environment overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ServerConfig::default()`]
//! 2. If a config file is given and exists, deep-merge its values over defaults
//! 3. Apply `REXPRO_*` environment variable overrides (highest priority)

use std::path::Path;

use rexpro_filter::{FilterConfig, MetadataPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the RexPro server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (`0` picks a free port).
    pub port: u16,
    /// Largest accepted WebSocket frame in bytes.
    pub max_message_size: usize,
    /// Graphs sessions may bind, by name.
    pub graphs: Vec<String>,
    /// Script languages advertised to new sessions, in order.
    pub languages: Vec<String>,
    /// Default log level (`RUST_LOG` still wins).
    pub log_level: String,
    /// Emit JSON log lines.
    pub json_logs: bool,
    pub filter: FilterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8184,
            max_message_size: 16 * 1024 * 1024,
            graphs: vec!["tinkergraph".into()],
            languages: vec!["groovy".into()],
            log_level: "info".into(),
            json_logs: true,
            filter: FilterConfig::default(),
        }
    }
}

/// Load configuration from an optional file, then apply env overrides.
///
/// A missing file yields defaults; an unreadable or invalid one is an error.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let defaults = serde_json::to_value(ServerConfig::default())?;

    let merged = match path {
        Some(path) if path.exists() => {
            debug!(?path, "loading config from file");
            let content = std::fs::read_to_string(path)?;
            let user: Value = serde_json::from_str(&content)?;
            deep_merge(defaults, user)
        }
        Some(path) => {
            debug!(?path, "config file not found, using defaults");
            defaults
        }
        None => defaults,
    };

    let mut config: ServerConfig = serde_json::from_value(merged)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Recursive merge: objects merge per key, everything else is replaced by
/// `source`. Nulls in `source` keep the `target` value.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `REXPRO_*` overrides read through `lookup`.
///
/// Invalid values are ignored and the file/default value is kept.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("REXPRO_HOST").and_then(non_empty) {
        config.host = v;
    }
    if let Some(v) = lookup("REXPRO_PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
        config.port = v;
    }
    if let Some(v) = lookup("REXPRO_METADATA_POLICY").and_then(|v| v.parse::<MetadataPolicy>().ok()) {
        config.filter.metadata_policy = v;
    }
    if let Some(v) = lookup("REXPRO_MAX_MINT_ATTEMPTS").and_then(|v| parse_u32_in(&v, 1, 100)) {
        config.filter.max_mint_attempts = v;
    }
    if let Some(v) = lookup("REXPRO_LOG_LEVEL").and_then(non_empty) {
        config.log_level = v;
    }
    if let Some(v) = lookup("REXPRO_JSON_LOGS").and_then(|v| parse_bool(&v)) {
        config.json_logs = v;
    }
}

/// Parse a boolean: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an integer within `[min, max]`.
pub fn parse_u32_in(val: &str, min: u32, max: u32) -> Option<u32> {
    val.trim().parse::<u32>().ok().filter(|v| (min..=max).contains(v))
}

fn non_empty(val: String) -> Option<String> {
    let trimmed = val.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
