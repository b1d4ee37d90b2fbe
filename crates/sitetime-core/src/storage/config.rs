//! TOML-based application configuration.
//!
//! Stores:
//! - Indicator colors for the running, paused and expired states
//! - Per-origin time budget rules
//!
//! Configuration is stored at `~/.config/sitetime/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Indicator colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_running_color")]
    pub running_color: String,
    #[serde(default = "default_paused_color")]
    pub paused_color: String,
    #[serde(default = "default_expired_color")]
    pub expired_color: String,
}

/// What a rule does once its origin's budget is spent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionConfig {
    /// Only mark the timer expired.
    #[default]
    Timeout,
    /// Open another page in place of the site.
    Redirect { url: String },
    /// Run a program.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Time budget for one origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_minutes: Option<u64>,
    /// Takes precedence over `threshold_minutes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_ms: Option<u64>,
    #[serde(default)]
    pub action: ActionConfig,
}

impl RuleConfig {
    pub fn threshold_ms(&self) -> Option<u64> {
        self.threshold_ms
            .or_else(|| self.threshold_minutes.map(|m| m.saturating_mul(60_000)))
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sitetime/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indicator: IndicatorConfig,
    /// Keyed by origin hostname.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

fn default_running_color() -> String {
    "#1a5fb4".into()
}
fn default_paused_color() -> String {
    "#e5a50a".into()
}
fn default_expired_color() -> String {
    "#a51d2d".into()
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            running_color: default_running_color(),
            paused_color: default_paused_color(),
            expired_color: default_expired_color(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/sitetime"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Origins contain dots, so rule keys are addressed as
    /// `rules.<origin>` with the remainder taken as the origin
    /// (`rules.twitter.com`), or `rules.<origin>#<field>` for one field.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = match key.strip_prefix("rules.") {
            Some(rest) => {
                let (origin, field) = match rest.split_once('#') {
                    Some((origin, field)) => (origin, Some(field)),
                    None => (rest, None),
                };
                let rule = json.get("rules")?.get(origin)?;
                match field {
                    Some(field) => Self::get_json_value_by_path(rule, field)?,
                    None => rule,
                }
            }
            None => Self::get_json_value_by_path(&json, key)?,
        };
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

}
