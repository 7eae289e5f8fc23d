//! Runtime configuration. Passed explicitly into the tool runtime; nothing reads it globally.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ConfiguratorError, ConfiguratorResult};

const DEFAULT_BASE_URL: &str = "http://localhost:3000/tools/configurator";
const DEFAULT_STORAGE_DIR: &str = ".configurator";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfiguratorConfig {
    /// Page URL the share token is appended to. Any fragment is stripped.
    pub base_url: String,
    /// Directory for [`crate::storage::FileStorage`].
    pub storage_dir: PathBuf,
    /// Transport timeout for the schema fetch.
    pub fetch_timeout_ms: u64,
    /// Key renames applied when building the exported block config.
    pub renames: BTreeMap<String, String>,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            renames: BTreeMap::new(),
        }
    }
}

impl ConfiguratorConfig {
    /// Defaults overridden by `CONFIGURATOR_BASE_URL`, `CONFIGURATOR_STORAGE_DIR`
    /// and `CONFIGURATOR_FETCH_TIMEOUT_MS`.
    pub fn from_env() -> ConfiguratorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> ConfiguratorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfiguratorResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("CONFIGURATOR_BASE_URL") {
            config.base_url = url;
        }
        if let Some(dir) = lookup("CONFIGURATOR_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(ms) = lookup("CONFIGURATOR_FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = ms.trim().parse().map_err(|_| ConfiguratorError::Config {
                key: "CONFIGURATOR_FETCH_TIMEOUT_MS".to_string(),
                reason: format!("'{}' is not a number of milliseconds", ms),
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("CONFIGURATOR_BASE_URL", "https://example.com/page"),
            ("CONFIGURATOR_FETCH_TIMEOUT_MS", " 2500 "),
        ]
        .into_iter()
        .collect();

        let config =
            ConfiguratorConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "https://example.com/page");
        assert_eq!(config.fetch_timeout_ms, 2500);
        assert_eq!(config.storage_dir, PathBuf::from(DEFAULT_STORAGE_DIR));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let result = ConfiguratorConfig::from_lookup(|k| {
            (k == "CONFIGURATOR_FETCH_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfiguratorError::Config { .. })));
    }

    #[test]
    fn test_json_fills_missing_keys() {
        let config =
            ConfiguratorConfig::from_json_str(r#"{ "renames": { "seats": "quantity" } }"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.renames.get("seats").map(String::as_str), Some("quantity"));
    }
}
