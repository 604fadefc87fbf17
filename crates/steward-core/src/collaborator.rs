//! Contract for the keyed-configuration collaborator.
//!
//! Steward does not implement keyed configuration. Components that expose a
//! "set named value under a key" operation implement [`KeyedConfig`] so that
//! an authority registry can gate calls to it without knowing its internals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event reported by a collaborator after a value was filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filed {
    /// Key that was written.
    pub key: String,
    /// Value stored under the key.
    pub value: String,
}

/// Errors a keyed-configuration collaborator may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyedConfigError {
    /// The key is not recognised by the collaborator.
    #[error("invalid key: {key}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// The value is not acceptable for the given key.
    #[error("invalid value for key {key}: {value}")]
    InvalidValueForKey {
        /// The key being written.
        key: String,
        /// The rejected value.
        value: String,
    },
}

/// A component exposing a keyed write operation.
pub trait KeyedConfig {
    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyedConfigError::InvalidKey`] or
    /// [`KeyedConfigError::InvalidValueForKey`] when the write is rejected.
    fn set_value(&mut self, key: &str, value: &str) -> Result<Filed, KeyedConfigError>;
}
