//! Runtime configuration.
//!
//! Read from `AYKA_`-prefixed environment variables, after an optional
//! `.env` file has been loaded by the binary.

use crate::models::WeekendPolicy;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the JSON source files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Used when neither the request nor the stored settings name one.
    #[serde(default)]
    pub weekend_policy: WeekendPolicy,

    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Read `AYKA_*` from the process environment.
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_pairs(std::env::vars())
    }

    /// Build from explicit key/value pairs; keys without the prefix are
    /// ignored.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("AYKA_").from_iter(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_to_an_empty_environment() {
        let config = Config::from_pairs(Vec::new()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.weekend_policy, WeekendPolicy::SaturdayAndSunday);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_pairs(pairs(&[
            ("AYKA_DATA_DIR", "/srv/ayka"),
            ("AYKA_BIND_ADDR", "0.0.0.0:8080"),
            ("AYKA_WEEKEND_POLICY", "sunday_only"),
            ("AYKA_LOG_FORMAT", "json"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/ayka"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.weekend_policy, WeekendPolicy::SundayOnly);
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn rejects_unknown_weekend_policy() {
        assert!(Config::from_pairs(pairs(&[("AYKA_WEEKEND_POLICY", "friday")])).is_err());
    }
}
