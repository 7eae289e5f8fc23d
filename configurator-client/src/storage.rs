//! Saved form state, keyed by the tool's storage key.

use configurator_schema::FormState;
use dashmap::DashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{ConfiguratorError, ConfiguratorResult};

pub trait Persistence: Send + Sync {
    fn save(&self, state: &FormState, key: &str) -> ConfiguratorResult<()>;
    /// `None` when nothing usable is stored under `key`.
    fn load(&self, key: &str) -> Option<FormState>;
}

/// One JSON file per key under `base_path`.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl Persistence for FileStorage {
    fn save(&self, state: &FormState, key: &str) -> ConfiguratorResult<()> {
        let storage_err = |reason: String| ConfiguratorError::Storage {
            key: key.to_string(),
            reason,
        };
        fs::create_dir_all(&self.base_path).map_err(|e| storage_err(e.to_string()))?;
        let json = serde_json::to_string(state)?;
        fs::write(self.path_for(key), json).map_err(|e| storage_err(e.to_string()))
    }

    fn load(&self, key: &str) -> Option<FormState> {
        let text = fs::read_to_string(self.path_for(key)).ok()?;
        match serde_json::from_str(&text) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("ignoring unreadable saved state '{}': {}", key, e);
                None
            }
        }
    }
}

/// Process-local storage.
#[derive(Default)]
pub struct MemoryStorage {
    entries: DashMap<String, FormState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStorage {
    fn save(&self, state: &FormState, key: &str) -> ConfiguratorResult<()> {
        self.entries.insert(key.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Option<FormState> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormState {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        let state = form(&[("seats", "4"), ("term", "Y")]);

        assert_eq!(storage.load("pricingConfiguratorState"), None);
        storage.save(&state, "pricingConfiguratorState").unwrap();
        assert_eq!(storage.load("pricingConfiguratorState"), Some(state));
    }

    #[test]
    fn test_file_storage_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("k.json"), "{ not json").unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.load("k"), None);
    }

    #[test]
    fn test_memory_storage_overwrites() {
        let storage = MemoryStorage::new();
        storage.save(&form(&[("a", "1")]), "k").unwrap();
        storage.save(&form(&[("a", "2")]), "k").unwrap();
        assert_eq!(storage.load("k"), Some(form(&[("a", "2")])));
    }
}
