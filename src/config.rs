//! Configuration loader and validator for the verse bot.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::timezone;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub telegram: Telegram,
    pub health: Health,
    pub timezones: Vec<TimezoneOption>,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    /// Seconds between scheduler ticks. One hour matches the granularity
    /// of the local-hour delivery window.
    pub tick_interval_seconds: u64,
    /// Local hour (0-23) at which subscribers receive the daily verse.
    pub daily_hour: u32,
    /// Maximum verses returned by keyword and topic searches.
    pub search_limit: i64,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    pub bot_token: String,
}

/// Keep-alive HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub bind_addr: String,
}

/// One selectable timezone: `key` is what the user types after
/// `/timezone`, `offset` is an identifier understood by
/// [`timezone::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimezoneOption {
    pub key: String,
    pub label: String,
    pub offset: String,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    /// Look up a catalog entry by its selection key.
    pub fn timezone_by_key(&self, key: &str) -> Option<&TimezoneOption> {
        self.timezones.iter().find(|tz| tz.key == key)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.tick_interval_seconds == 0 {
        return Err(ConfigError::Invalid("app.tick_interval_seconds must be > 0"));
    }
    if cfg.app.daily_hour > 23 {
        return Err(ConfigError::Invalid("app.daily_hour must be 0-23"));
    }
    if cfg.app.search_limit <= 0 {
        return Err(ConfigError::Invalid("app.search_limit must be > 0"));
    }

    if cfg.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::Invalid("telegram.bot_token must be non-empty"));
    }

    if cfg.health.bind_addr.trim().is_empty() {
        return Err(ConfigError::Invalid("health.bind_addr must be non-empty"));
    }

    if cfg.timezones.is_empty() {
        return Err(ConfigError::Invalid("timezones must list at least one option"));
    }
    for tz in &cfg.timezones {
        if tz.key.trim().is_empty() {
            return Err(ConfigError::Invalid("timezones[].key must be non-empty"));
        }
        if tz.label.trim().is_empty() {
            return Err(ConfigError::Invalid("timezones[].label must be non-empty"));
        }
        if timezone::resolve(&tz.offset).is_none() {
            return Err(ConfigError::Invalid(
                "timezones[].offset must be UTC, UTC±H or UTC±HH:MM",
            ));
        }
    }
    let mut keys: Vec<&str> = cfg.timezones.iter().map(|tz| tz.key.as_str()).collect();
    keys.sort_unstable();
    keys.dedup();
    if keys.len() != cfg.timezones.len() {
        return Err(ConfigError::Invalid("timezones[].key values must be unique"));
    }

    Ok(())
}

/// Example YAML document; parsed by tests and shipped as a starting point.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  tick_interval_seconds: 3600
  daily_hour: 6
  search_limit: 5

telegram:
  bot_token: "YOUR_TELEGRAM_BOT_TOKEN"

health:
  bind_addr: "0.0.0.0:8080"

timezones:
  - key: "1"
    label: "London (UTC)"
    offset: "UTC"
  - key: "2"
    label: "Berlin (UTC+1)"
    offset: "UTC+01:00"
  - key: "3"
    label: "Nairobi (UTC+3)"
    offset: "UTC+03:00"
  - key: "4"
    label: "Mumbai (UTC+5:30)"
    offset: "UTC+05:30"
  - key: "5"
    label: "Manila (UTC+8)"
    offset: "UTC+08:00"
  - key: "6"
    label: "Sao Paulo (UTC-3)"
    offset: "UTC-03:00"
  - key: "7"
    label: "New York (UTC-5)"
    offset: "UTC-05:00"
  - key: "8"
    label: "Los Angeles (UTC-8)"
    offset: "UTC-08:00"
"#
}
