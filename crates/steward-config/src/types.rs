//! Configuration struct definitions.
//!
//! Every section implements [`Default`] so that a bare `[section]` header,
//! or no file at all, yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the `steward` tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level, format and per-crate directives.
    pub logging: LoggingSection,
    /// Audit journal settings.
    pub journal: JournalSection,
    /// Registry bootstrap settings.
    pub registry: RegistrySection,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level (`"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate directives (e.g. `["steward_registry=debug"]`).
    pub directives: Vec<String>,
    /// Where logs go: `"stderr"`, `"stdout"` or `"file"`.
    pub target: String,
    /// Log directory, required when `target = "file"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// File rotation: `"daily"`, `"hourly"` or `"never"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: None,
            rotation: "daily".to_owned(),
        }
    }
}

/// Audit journal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSection {
    /// Key-value namespace that durable records are written to.
    pub namespace: String,
    /// Buffer size of the async record channel.
    pub channel_capacity: usize,
    /// Whether to write every record to a durable sink before applying it.
    pub persist: bool,
    /// Directory of the on-disk store, required when `persist` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for JournalSection {
    fn default() -> Self {
        Self {
            namespace: "steward:audit".to_owned(),
            channel_capacity: 1024,
            persist: false,
            path: None,
        }
    }
}

/// Registry bootstrap configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Default creator (label or 64-char hex) when a script names none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}
