//! Engine configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `ACT_DATA_DIR` | unset | directory with `dictionaries/*.yaml` and `equations/*.yaml` |
//! | `ACT_DEFAULT_DICTIONARY` | `us_2015` | dictionary used when a request names none |
//! | `ACT_LOOKUP_TIMEOUT_MS` | `2000` | per-call dictionary timeout |
//! | `ACT_LOOKUP_RETRIES` | `1` | retries after a failed dictionary call, at most 5 |
//! | `PORT` | `8080` | HTTP server port |

use std::path::PathBuf;
use std::time::Duration;

use crate::dictionary::resilient::MAX_RETRIES;
use crate::error::{ActError, ActResult};

pub const DEFAULT_DICTIONARY: &str = "us_2015";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub data_dir: Option<PathBuf>,
    pub default_dictionary: String,
    pub lookup_timeout: Duration,
    pub lookup_retries: u32,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_dictionary: DEFAULT_DICTIONARY.to_string(),
            lookup_timeout: Duration::from_millis(2000),
            lookup_retries: 1,
            port: 8080,
        }
    }
}

impl EngineConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> ActResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup; unset keys keep defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> ActResult<Self> {
        let mut config = Self::default();
        if let Some(dir) = get("ACT_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(dict) = get("ACT_DEFAULT_DICTIONARY").filter(|s| !s.trim().is_empty()) {
            config.default_dictionary = dict.trim().to_string();
        }
        if let Some(ms) = get("ACT_LOOKUP_TIMEOUT_MS") {
            config.lookup_timeout = Duration::from_millis(parse("ACT_LOOKUP_TIMEOUT_MS", &ms)?);
        }
        if let Some(n) = get("ACT_LOOKUP_RETRIES") {
            config.lookup_retries = parse("ACT_LOOKUP_RETRIES", &n)?;
            if config.lookup_retries > MAX_RETRIES {
                return Err(ActError::config(format!(
                    "ACT_LOOKUP_RETRIES must be at most {}, got {}",
                    MAX_RETRIES, config.lookup_retries
                )));
            }
        }
        if let Some(port) = get("PORT") {
            config.port = parse("PORT", &port)?;
        }
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ActResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ActError::config(format!("{} has an invalid value '{}'", key, value)))
}
