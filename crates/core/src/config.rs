// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! A single JSON document at `{configDir}/config.json` is deep-merged over
//! compiled-in defaults: objects merge recursively, arrays and scalars
//! replace. A leading `~` in path values expands to the user's home
//! directory. A missing file yields pure defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable selecting the config directory.
pub const CONFIG_ENV_VAR: &str = "PA_CONFIG";

/// File name of the config document inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration, merged over [`Config::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub security: SecurityConfig,
    pub adapters: AdaptersConfig,
    pub heartbeat: HeartbeatConfig,
    pub gateway: GatewayConfig,
    pub agent: AgentConfig,
    pub session: SessionConfig,
    pub memory: MemoryConfig,
}

/// Inputs to the command-security gate plus filesystem roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    /// Base command names the gate will allow.
    pub allowed_commands: Vec<String>,
    /// Allowed commands that additionally get command-specific checks.
    pub commands_needing_extra_validation: Vec<String>,
    /// Workspace root; the default read/write directory.
    pub workspace: PathBuf,
    /// Data directory for sessions and the cron store.
    pub data_dir: PathBuf,
    pub additional_read_dirs: Vec<PathBuf>,
    pub additional_write_dirs: Vec<PathBuf>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_commands: [
                "ls", "cat", "grep", "head", "tail", "wc", "find", "echo", "pwd", "date",
                "sort", "uniq", "cut", "tr", "sed", "awk", "diff", "mkdir", "touch", "cp",
                "mv", "rm", "ps", "kill", "sleep", "git",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            commands_needing_extra_validation: vec!["rm".to_string(), "kill".to_string()],
            workspace: PathBuf::from("~/.pa/workspace"),
            data_dir: PathBuf::from("~/.pa/data"),
            additional_read_dirs: Vec::new(),
            additional_write_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptersConfig {
    pub telegram: TelegramConfig,
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TelegramMode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: String,
    /// Empty means allow all users.
    pub allowed_user_ids: Vec<i64>,
    pub mode: TelegramMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SlackConfig {
    pub enabled: bool,
    pub bot_token: String,
    pub app_token: String,
    pub socket_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatConfig {
    pub enabled: bool,
    pub interval_minutes: u64,
    /// `"H1-H2"`: fire when the local hour is in `[H1, H2)`. `0-24` is all day.
    pub active_hours: String,
    /// Where substantive heartbeat replies go: an adapter name, optionally
    /// followed by `--` and a conversation id (e.g. `telegram--123456789`).
    pub deliver_to: String,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: 30,
            active_hours: "8-22".to_string(),
            deliver_to: "telegram".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub max_queue_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { max_queue_size: 20 }
    }
}

/// Options passed through to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub model: String,
    pub max_turns: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_turns: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub max_history_messages: usize,
    pub compaction_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history_messages: 200,
            compaction_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryConfig {
    /// Opaque search options passed through to the memory index.
    pub search: Value,
    pub extra_paths: Vec<PathBuf>,
}

impl Config {
    /// Load config from `{config_dir}/config.json`, merged over defaults.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let defaults = serde_json::to_value(Config::default())?;
        let merged = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let overlay: Value = serde_json::from_str(&raw)?;
            deep_merge(defaults, overlay)
        } else {
            defaults
        };
        let mut config: Config = serde_json::from_value(merged)?;
        config.expand_home();
        Ok(config)
    }

    /// Expand a leading `~` in all configured paths.
    fn expand_home(&mut self) {
        self.security.workspace = expand_tilde(&self.security.workspace);
        self.security.data_dir = expand_tilde(&self.security.data_dir);
        for dir in &mut self.security.additional_read_dirs {
            *dir = expand_tilde(dir);
        }
        for dir in &mut self.security.additional_write_dirs {
            *dir = expand_tilde(dir);
        }
        for path in &mut self.memory.extra_paths {
            *path = expand_tilde(path);
        }
    }

    /// Directory holding per-session transcript files.
    pub fn sessions_dir(&self) -> PathBuf {
        self.security.data_dir.join("sessions")
    }

    /// Path of the persisted cron-job store.
    pub fn cron_store_path(&self) -> PathBuf {
        self.security.data_dir.join("cron-jobs.json")
    }
}

/// Resolve the config directory: explicit flag > `PA_CONFIG` > `~/.pa`.
pub fn resolve_config_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Ok(dir) = std::env::var(CONFIG_ENV_VAR) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_config_dir()
}

/// Default user-level config directory (`~/.pa`).
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pa")
}

/// Expand a leading `~` (or `~/...`) to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if s == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Deep merge: objects merge key-by-key, everything else replaces.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
