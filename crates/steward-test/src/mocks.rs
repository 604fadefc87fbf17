//! Mock collaborators.

use std::collections::{BTreeMap, BTreeSet};

use steward_core::{Filed, KeyedConfig, KeyedConfigError};

/// In-memory keyed configuration with a fixed set of accepted keys.
///
/// Empty values are rejected with [`KeyedConfigError::InvalidValueForKey`].
#[derive(Debug, Clone, Default)]
pub struct MockKeyedConfig {
    keys: BTreeSet<String>,
    values: BTreeMap<String, String>,
    filed: Vec<Filed>,
}

impl MockKeyedConfig {
    /// Create a mock that accepts no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept writes to `key`.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Current value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Every `Filed` event emitted so far.
    #[must_use]
    pub fn filed(&self) -> &[Filed] {
        &self.filed
    }
}

impl KeyedConfig for MockKeyedConfig {
    fn set_value(&mut self, key: &str, value: &str) -> Result<Filed, KeyedConfigError> {
        if !self.keys.contains(key) {
            return Err(KeyedConfigError::InvalidKey {
                key: key.to_string(),
            });
        }
        if value.is_empty() {
            return Err(KeyedConfigError::InvalidValueForKey {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        self.values.insert(key.to_string(), value.to_string());
        let filed = Filed {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.filed.push(filed.clone());
        Ok(filed)
    }
}
